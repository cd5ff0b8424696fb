use std::any::Any;

use crate::error::{require_length_or_auto, LayoutError};
use crate::geometry::{Rect, Size};
use crate::layout::{LayoutContext, LayoutPolicy, Orientation};
use crate::tree::NodeId;

/// Stacks children one after another along `orientation`.
///
/// Children are measured unconstrained along the stacking axis, so the
/// panel's extent there is the sum of the children; across it the panel is as
/// large as its largest child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackPanel {
    pub orientation: Orientation,
}

impl StackPanel {
    pub fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }
}

/// Extent of a child along the stacking axis: zero when collapsed, else
/// `item_length` when set, else the child's desired length.
fn stacked_length(cx: &LayoutContext<'_>, child: NodeId, item_length: f64, desired: f64) -> f64 {
    if cx.is_collapsed(child) {
        0.0
    } else if item_length.is_nan() {
        desired
    } else {
        item_length
    }
}

/// Shared measure for stacking strategies. `item_length` fixes every child's
/// extent along the stacking axis when it is not NaN.
fn measure_stack(
    cx: &mut LayoutContext<'_>,
    orientation: Orientation,
    available: Size,
    item_length: f64,
) -> Size {
    let along = if item_length.is_nan() {
        f64::INFINITY
    } else {
        item_length
    };
    let mut total = Size::ZERO;
    for child in cx.children() {
        match orientation {
            Orientation::Horizontal => {
                let desired = cx.measure_child(child, Size::new(along, available.height));
                let width = stacked_length(cx, child, item_length, desired.width);
                total.width += width;
                total.height = total.height.max(desired.height);
            }
            Orientation::Vertical => {
                let desired = cx.measure_child(child, Size::new(available.width, along));
                let height = stacked_length(cx, child, item_length, desired.height);
                total.width = total.width.max(desired.width);
                total.height += height;
            }
        }
    }
    total
}

fn arrange_stack(
    cx: &mut LayoutContext<'_>,
    orientation: Orientation,
    final_size: Size,
    item_length: f64,
) -> Size {
    let mut cursor = 0.0;
    for child in cx.children() {
        let desired = cx.desired_size(child);
        let slot = match orientation {
            Orientation::Horizontal => {
                let width = stacked_length(cx, child, item_length, desired.width);
                let slot = Rect::new(cursor, 0.0, width, final_size.height);
                cursor += width;
                slot
            }
            Orientation::Vertical => {
                let height = stacked_length(cx, child, item_length, desired.height);
                let slot = Rect::new(0.0, cursor, final_size.width, height);
                cursor += height;
                slot
            }
        };
        cx.arrange_child(child, slot);
    }
    final_size
}

impl LayoutPolicy for StackPanel {
    fn kind(&self) -> &'static str {
        "StackPanel"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        measure_stack(cx, self.orientation, available, f64::NAN)
    }

    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        arrange_stack(cx, self.orientation, final_size, f64::NAN)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Item host of a list box: a vertical stack whose items are offered the
/// full width of the list, optionally with a uniform row height.
///
/// Items with the default `Stretch` alignment fill the offered width; an item
/// with its own horizontal alignment keeps its desired width inside the row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListBox {
    item_height: f64,
}

impl Default for ListBox {
    fn default() -> Self {
        Self {
            item_height: f64::NAN,
        }
    }
}

impl ListBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform row height; NaN sizes each row to its item.
    pub fn item_height(&self) -> f64 {
        self.item_height
    }

    pub fn set_item_height(&mut self, height: f64) -> Result<(), LayoutError> {
        require_length_or_auto("ListBox.ItemHeight", height)?;
        self.item_height = height;
        Ok(())
    }
}

impl LayoutPolicy for ListBox {
    fn kind(&self) -> &'static str {
        "ListBox"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        measure_stack(cx, Orientation::Vertical, available, self.item_height)
    }

    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        arrange_stack(cx, Orientation::Vertical, final_size, self.item_height)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Visibility;
    use crate::testing::RecordingPeer;
    use crate::layout::HorizontalAlignment;
    use crate::tree::LayoutTree;

    fn stacked<P: LayoutPolicy>(
        tree: &mut LayoutTree,
        panel: P,
        sizes: &[(f64, f64)],
    ) -> (NodeId, Vec<NodeId>) {
        let id = tree.create(panel);
        let children = sizes
            .iter()
            .map(|&(width, height)| {
                let child = tree.create_leaf(RecordingPeer::new(width, height));
                tree.add_child(id, child).unwrap();
                child
            })
            .collect();
        (id, children)
    }

    #[test]
    fn test_horizontal_stack() {
        let mut tree = LayoutTree::new();
        let (panel, children) = stacked(
            &mut tree,
            StackPanel::new(Orientation::Horizontal),
            &[(30.0, 10.0), (20.0, 25.0)],
        );

        tree.update_layout(panel, Size::new(200.0, 40.0)).unwrap();
        assert_eq!(tree.node(panel).unwrap().desired_size(), Size::new(50.0, 25.0));
        assert_eq!(tree.node(children[1]).unwrap().frame(), Rect::new(30.0, 0.0, 20.0, 40.0));
    }

    #[test]
    fn test_collapsed_children_take_no_space() {
        let mut tree = LayoutTree::new();
        let (panel, children) = stacked(
            &mut tree,
            StackPanel::new(Orientation::Vertical),
            &[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0)],
        );
        tree.set_visibility(children[1], Visibility::Collapsed).unwrap();

        tree.update_layout(panel, Size::new(50.0, 100.0)).unwrap();
        assert_eq!(tree.node(panel).unwrap().desired_size(), Size::new(10.0, 20.0));
        assert_eq!(tree.node(children[2]).unwrap().frame().y, 10.0);
        assert_eq!(tree.node(children[1]).unwrap().frame().size(), Size::ZERO);
    }

    #[test]
    fn test_list_box_items_span_list_width() {
        let mut tree = LayoutTree::new();
        let (list, items) = stacked(&mut tree, ListBox::new(), &[(40.0, 12.0), (70.0, 12.0)]);

        tree.update_layout(list, Size::new(120.0, 300.0)).unwrap();
        assert_eq!(tree.node(items[0]).unwrap().frame(), Rect::new(0.0, 0.0, 120.0, 12.0));
        assert_eq!(tree.node(items[1]).unwrap().frame(), Rect::new(0.0, 12.0, 120.0, 12.0));
    }

    #[test]
    fn test_list_box_uniform_rows() {
        let mut tree = LayoutTree::new();
        let mut list = ListBox::new();
        list.set_item_height(20.0).unwrap();
        assert!(list.set_item_height(f64::INFINITY).is_err());
        let (list, items) = stacked(&mut tree, list, &[(10.0, 5.0), (10.0, 30.0), (10.0, 5.0)]);

        tree.update_layout(list, Size::new(50.0, 300.0)).unwrap();
        assert_eq!(tree.node(list).unwrap().desired_size().height, 60.0);
        assert_eq!(tree.node(items[2]).unwrap().frame().y, 40.0);
    }

    #[test]
    fn test_list_box_uniform_rows_skip_collapsed_items() {
        let mut tree = LayoutTree::new();
        let mut list = ListBox::new();
        list.set_item_height(20.0).unwrap();
        let (list, items) = stacked(&mut tree, list, &[(10.0, 5.0), (10.0, 5.0), (10.0, 5.0)]);
        tree.set_visibility(items[1], Visibility::Collapsed).unwrap();

        tree.update_layout(list, Size::new(50.0, 300.0)).unwrap();
        assert_eq!(tree.node(list).unwrap().desired_size().height, 40.0);
        assert_eq!(tree.node(items[1]).unwrap().frame().size(), Size::ZERO);
        assert_eq!(tree.node(items[2]).unwrap().frame().y, 20.0);
    }

    #[test]
    fn test_list_box_item_alignment_overrides_stretch() {
        let mut tree = LayoutTree::new();
        let (list, items) = stacked(&mut tree, ListBox::new(), &[(40.0, 12.0), (70.0, 12.0)]);
        tree.set_horizontal_alignment(items[1], HorizontalAlignment::Left).unwrap();

        tree.update_layout(list, Size::new(120.0, 300.0)).unwrap();
        assert_eq!(tree.node(items[0]).unwrap().frame().width, 120.0);
        assert_eq!(tree.node(items[1]).unwrap().frame(), Rect::new(0.0, 12.0, 70.0, 12.0));
    }
}

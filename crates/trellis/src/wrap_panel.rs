use std::any::Any;

use trellis_macros::WithBuilders;

use crate::error::{require_length_or_auto, LayoutError};
use crate::geometry::{Rect, Size};
use crate::layout::{
    HorizontalAlignment, LayoutContext, LayoutPolicy, Orientation, VerticalAlignment,
};
use crate::tree::NodeId;

const EPSILON: f64 = 1e-6;

/// Lays children out along `orientation`, starting a new line whenever the
/// next child would overflow the panel's extent on that axis.
#[derive(Clone, Copy, Debug, PartialEq, WithBuilders)]
pub struct WrapPanel {
    pub orientation: Orientation,
    /// Horizontal placement of each line (or of children within a vertical line)
    pub horizontal_content_alignment: HorizontalAlignment,
    pub vertical_content_alignment: VerticalAlignment,
    #[with_builders(skip)]
    item_width: f64,
    #[with_builders(skip)]
    item_height: f64,
}

impl Default for WrapPanel {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            horizontal_content_alignment: HorizontalAlignment::Left,
            vertical_content_alignment: VerticalAlignment::Top,
            item_width: f64::NAN,
            item_height: f64::NAN,
        }
    }
}

/// A size split into the wrapping axis (`u`) and the line axis (`v`).
#[derive(Clone, Copy, Debug, Default)]
struct Extent {
    u: f64,
    v: f64,
}

impl WrapPanel {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }

    /// Uniform slot width for every child; NaN uses each child's desired width.
    pub fn item_width(&self) -> f64 {
        self.item_width
    }

    pub fn item_height(&self) -> f64 {
        self.item_height
    }

    pub fn set_item_width(&mut self, width: f64) -> Result<(), LayoutError> {
        require_length_or_auto("ItemWidth", width)?;
        self.item_width = width;
        Ok(())
    }

    pub fn set_item_height(&mut self, height: f64) -> Result<(), LayoutError> {
        require_length_or_auto("ItemHeight", height)?;
        self.item_height = height;
        Ok(())
    }

    fn split(&self, size: Size) -> Extent {
        match self.orientation {
            Orientation::Horizontal => Extent {
                u: size.width,
                v: size.height,
            },
            Orientation::Vertical => Extent {
                u: size.height,
                v: size.width,
            },
        }
    }

    fn join(&self, extent: Extent) -> Size {
        match self.orientation {
            Orientation::Horizontal => Size::new(extent.u, extent.v),
            Orientation::Vertical => Size::new(extent.v, extent.u),
        }
    }

    /// Slot a child occupies: the item size where set, its desired size otherwise.
    fn item_extent(&self, desired: Size) -> Extent {
        let width = if self.item_width.is_nan() {
            desired.width
        } else {
            self.item_width
        };
        let height = if self.item_height.is_nan() {
            desired.height
        } else {
            self.item_height
        };
        self.split(Size::new(width, height))
    }

    /// Like [`item_extent`](Self::item_extent), but collapsed children take no
    /// space even when a uniform item size is set.
    fn child_extent(&self, cx: &LayoutContext<'_>, child: NodeId) -> Extent {
        if cx.is_collapsed(child) {
            Extent::default()
        } else {
            self.item_extent(cx.desired_size(child))
        }
    }

    /// (line offset factor, cross factor, cross stretches)
    fn alignment_factors(&self) -> (f64, f64, bool) {
        let horizontal = match self.horizontal_content_alignment {
            HorizontalAlignment::Left | HorizontalAlignment::Stretch => 0.0,
            HorizontalAlignment::Center => 0.5,
            HorizontalAlignment::Right => 1.0,
        };
        let vertical = match self.vertical_content_alignment {
            VerticalAlignment::Top | VerticalAlignment::Stretch => 0.0,
            VerticalAlignment::Center => 0.5,
            VerticalAlignment::Bottom => 1.0,
        };
        match self.orientation {
            Orientation::Horizontal => (
                horizontal,
                vertical,
                self.vertical_content_alignment == VerticalAlignment::Stretch,
            ),
            Orientation::Vertical => (
                vertical,
                horizontal,
                self.horizontal_content_alignment == HorizontalAlignment::Stretch,
            ),
        }
    }

    fn arrange_line(
        &self,
        cx: &mut LayoutContext<'_>,
        line: &[NodeId],
        extent: Extent,
        offset_v: f64,
        final_extent: Extent,
    ) {
        let (line_factor, cross_factor, cross_stretch) = self.alignment_factors();
        let mut u = (final_extent.u - extent.u).max(0.0) * line_factor;

        for &child in line {
            let item = self.child_extent(cx, child);
            let (v, thickness) = if cross_stretch {
                (offset_v, extent.v)
            } else {
                (offset_v + (extent.v - item.v).max(0.0) * cross_factor, item.v)
            };
            let origin = self.join(Extent { u, v });
            let size = self.join(Extent {
                u: item.u,
                v: thickness,
            });
            let slot = Rect::new(origin.width, origin.height, size.width, size.height);
            cx.arrange_child(child, slot);
            u += item.u;
        }
    }
}

impl LayoutPolicy for WrapPanel {
    fn kind(&self) -> &'static str {
        "WrapPanel"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        let child_constraint = Size::new(
            if self.item_width.is_nan() {
                available.width
            } else {
                self.item_width
            },
            if self.item_height.is_nan() {
                available.height
            } else {
                self.item_height
            },
        );
        let limit = self.split(available).u;

        let mut line = Extent::default();
        let mut panel = Extent::default();
        let mut line_is_empty = true;

        for child in cx.children() {
            cx.measure_child(child, child_constraint);
            if cx.is_collapsed(child) {
                continue;
            }
            let item = self.child_extent(cx, child);

            if !line_is_empty && line.u + item.u > limit + EPSILON {
                panel.u = panel.u.max(line.u);
                panel.v += line.v;
                line = item;
            } else {
                line.u += item.u;
                line.v = line.v.max(item.v);
            }
            line_is_empty = false;
        }

        panel.u = panel.u.max(line.u);
        panel.v += line.v;
        self.join(panel)
    }

    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        let children = cx.children();
        let final_extent = self.split(final_size);

        let mut line_start = 0;
        let mut line = Extent::default();
        let mut offset_v = 0.0;

        for (index, &child) in children.iter().enumerate() {
            let item = self.child_extent(cx, child);
            if index > line_start && line.u + item.u > final_extent.u + EPSILON {
                self.arrange_line(cx, &children[line_start..index], line, offset_v, final_extent);
                offset_v += line.v;
                line = item;
                line_start = index;
            } else {
                line.u += item.u;
                line.v = line.v.max(item.v);
            }
        }

        if line_start < children.len() {
            self.arrange_line(cx, &children[line_start..], line, offset_v, final_extent);
        }

        final_size
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
    use crate::LayoutTree;

    fn filled(
        tree: &mut LayoutTree,
        panel: WrapPanel,
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
    fn test_third_child_wraps() {
        let mut tree = LayoutTree::new();
        let (panel, children) = filled(
            &mut tree,
            WrapPanel::default(),
            &[(40.0, 20.0), (40.0, 20.0), (40.0, 20.0)],
        );

        tree.update_layout(panel, Size::new(100.0, 200.0)).unwrap();
        assert_eq!(tree.node(panel).unwrap().desired_size(), Size::new(80.0, 40.0));

        let frames: Vec<Rect> = children
            .iter()
            .map(|&child| tree.node(child).unwrap().frame())
            .collect();
        assert_eq!(frames[0], Rect::new(0.0, 0.0, 40.0, 20.0));
        assert_eq!(frames[1], Rect::new(40.0, 0.0, 40.0, 20.0));
        assert_eq!(frames[2], Rect::new(0.0, 20.0, 40.0, 20.0));
    }

    #[test]
    fn test_exact_fit_does_not_wrap() {
        let mut tree = LayoutTree::new();
        let (panel, _) = filled(&mut tree, WrapPanel::default(), &[(50.0, 10.0), (50.0, 10.0)]);
        let desired = tree.measure(panel, Size::new(100.0, 100.0)).unwrap();
        assert_eq!(desired, Size::new(100.0, 10.0));
    }

    #[test]
    fn test_line_alignment() {
        let mut tree = LayoutTree::new();
        let panel = WrapPanel::default()
            .with_horizontal_content_alignment(HorizontalAlignment::Right)
            .with_vertical_content_alignment(VerticalAlignment::Bottom);
        let (panel, children) = filled(
            &mut tree,
            panel,
            &[(40.0, 10.0), (40.0, 20.0), (40.0, 20.0)],
        );

        tree.update_layout(panel, Size::new(100.0, 200.0)).unwrap();
        // First line is 80 wide and 20 tall, shifted right by 20
        assert_eq!(tree.node(children[0]).unwrap().frame(), Rect::new(20.0, 10.0, 40.0, 10.0));
        assert_eq!(tree.node(children[1]).unwrap().frame(), Rect::new(60.0, 0.0, 40.0, 20.0));
        assert_eq!(tree.node(children[2]).unwrap().frame(), Rect::new(60.0, 20.0, 40.0, 20.0));
    }

    #[test]
    fn test_vertical_orientation_wraps_into_columns() {
        let mut tree = LayoutTree::new();
        let (panel, children) = filled(
            &mut tree,
            WrapPanel::new(Orientation::Vertical),
            &[(10.0, 30.0), (20.0, 30.0), (10.0, 30.0)],
        );

        tree.update_layout(panel, Size::new(100.0, 70.0)).unwrap();
        assert_eq!(tree.node(panel).unwrap().desired_size(), Size::new(30.0, 60.0));
        assert_eq!(tree.node(children[1]).unwrap().frame(), Rect::new(0.0, 30.0, 20.0, 30.0));
        assert_eq!(tree.node(children[2]).unwrap().frame(), Rect::new(20.0, 0.0, 10.0, 30.0));
    }

    #[test]
    fn test_uniform_item_size() {
        let mut tree = LayoutTree::new();
        let mut panel = WrapPanel::default();
        panel.set_item_width(30.0).unwrap();
        assert!(panel.set_item_height(-1.0).is_err());
        let (panel, children) = filled(
            &mut tree,
            panel,
            &[(5.0, 10.0), (5.0, 10.0), (5.0, 10.0), (5.0, 10.0)],
        );

        tree.update_layout(panel, Size::new(100.0, 100.0)).unwrap();
        assert_eq!(tree.node(children[2]).unwrap().frame().x, 60.0);
        assert_eq!(tree.node(children[3]).unwrap().frame(), Rect::new(0.0, 10.0, 30.0, 10.0));
    }

    #[test]
    fn test_collapsed_child_skips_uniform_slot() {
        let mut tree = LayoutTree::new();
        let mut panel = WrapPanel::default();
        panel.set_item_width(30.0).unwrap();
        let (panel, children) = filled(
            &mut tree,
            panel,
            &[(5.0, 10.0), (5.0, 10.0), (5.0, 10.0)],
        );
        tree.set_visibility(children[1], Visibility::Collapsed).unwrap();

        tree.update_layout(panel, Size::new(100.0, 100.0)).unwrap();
        assert_eq!(tree.node(panel).unwrap().desired_size(), Size::new(60.0, 10.0));
        assert_eq!(tree.node(children[1]).unwrap().frame().size(), Size::ZERO);
        assert_eq!(tree.node(children[2]).unwrap().frame().x, 30.0);
    }
}

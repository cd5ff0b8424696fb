use std::any::Any;

use trellis_macros::WithBuilders;

use crate::error::LayoutError;
use crate::geometry::{Rect, Size};
use crate::layout::{LayoutContext, LayoutPolicy};
use crate::tree::{LayoutTree, NodeId};

/// Edge of the remaining space a DockPanel child attaches to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dock {
    #[default]
    Left,
    Top,
    Right,
    Bottom,
}

impl Dock {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Docks children, in collection order, against the edges of whatever
/// space the earlier children left over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, WithBuilders)]
pub struct DockPanel {
    /// The last child ignores its dock and fills the remaining space
    pub last_child_fill: bool,
}

impl Default for DockPanel {
    fn default() -> Self {
        Self {
            last_child_fill: true,
        }
    }
}

impl DockPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dock(tree: &mut LayoutTree, id: NodeId, dock: Dock) -> Result<(), LayoutError> {
        tree.require(id)?;
        if Self::dock(tree, id) != dock {
            tree.docks.insert(id, dock);
            tree.invalidate_parent(id);
        }
        Ok(())
    }

    pub fn dock(tree: &LayoutTree, id: NodeId) -> Dock {
        tree.docks.get(id).copied().unwrap_or_default()
    }
}

impl LayoutPolicy for DockPanel {
    fn kind(&self) -> &'static str {
        "DockPanel"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        // Space consumed by the docked children so far, per axis
        let mut used = Size::ZERO;
        let mut extent = Size::ZERO;

        for child in cx.children() {
            let remaining = Size::new(
                (available.width - used.width).max(0.0),
                (available.height - used.height).max(0.0),
            );
            let desired = cx.measure_child(child, remaining);

            if cx.dock(child).is_horizontal() {
                extent.height = extent.height.max(used.height + desired.height);
                used.width += desired.width;
            } else {
                extent.width = extent.width.max(used.width + desired.width);
                used.height += desired.height;
            }
        }

        extent.max(used)
    }

    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        let children = cx.children();
        let fill_index = if self.last_child_fill {
            children.len().saturating_sub(1)
        } else {
            children.len()
        };

        let (mut left, mut top, mut right, mut bottom) = (0.0, 0.0, 0.0, 0.0);
        for (index, &child) in children.iter().enumerate() {
            let desired = cx.desired_size(child);
            let mut slot = Rect::new(
                left,
                top,
                final_size.width - (left + right),
                final_size.height - (top + bottom),
            );

            if index < fill_index {
                match cx.dock(child) {
                    Dock::Left => {
                        left += desired.width;
                        slot.width = desired.width;
                    }
                    Dock::Right => {
                        right += desired.width;
                        slot.x = (final_size.width - right).max(0.0);
                        slot.width = desired.width;
                    }
                    Dock::Top => {
                        top += desired.height;
                        slot.height = desired.height;
                    }
                    Dock::Bottom => {
                        bottom += desired.height;
                        slot.y = (final_size.height - bottom).max(0.0);
                        slot.height = desired.height;
                    }
                }
            }

            cx.arrange_child(child, slot);
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
    use crate::testing::RecordingPeer;

    fn frame(tree: &LayoutTree, id: NodeId) -> Rect {
        tree.node(id).unwrap().frame()
    }

    #[test]
    fn test_last_child_fills_remaining_space() {
        let mut tree = LayoutTree::new();
        let panel = tree.create(DockPanel::new());
        let first = tree.create_leaf(RecordingPeer::new(50.0, 10.0));
        let second = tree.create_leaf(RecordingPeer::new(50.0, 10.0));
        let fill = tree.create_leaf(RecordingPeer::new(10.0, 10.0));
        for child in [first, second, fill] {
            tree.add_child(panel, child).unwrap();
        }
        DockPanel::set_dock(&mut tree, first, Dock::Left).unwrap();
        DockPanel::set_dock(&mut tree, second, Dock::Left).unwrap();

        tree.update_layout(panel, Size::new(300.0, 100.0)).unwrap();
        assert_eq!(frame(&tree, first), Rect::new(0.0, 0.0, 50.0, 100.0));
        assert_eq!(frame(&tree, second), Rect::new(50.0, 0.0, 50.0, 100.0));
        assert_eq!(frame(&tree, fill), Rect::new(100.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_all_edges() {
        let mut tree = LayoutTree::new();
        let panel = tree.create(DockPanel::new().with_last_child_fill(false));
        let top = tree.create_leaf(RecordingPeer::new(10.0, 20.0));
        let right = tree.create_leaf(RecordingPeer::new(30.0, 10.0));
        let bottom = tree.create_leaf(RecordingPeer::new(10.0, 15.0));
        let last = tree.create_leaf(RecordingPeer::new(40.0, 10.0));
        for child in [top, right, bottom, last] {
            tree.add_child(panel, child).unwrap();
        }
        DockPanel::set_dock(&mut tree, top, Dock::Top).unwrap();
        DockPanel::set_dock(&mut tree, right, Dock::Right).unwrap();
        DockPanel::set_dock(&mut tree, bottom, Dock::Bottom).unwrap();

        tree.update_layout(panel, Size::new(200.0, 100.0)).unwrap();
        assert_eq!(frame(&tree, top), Rect::new(0.0, 0.0, 200.0, 20.0));
        assert_eq!(frame(&tree, right), Rect::new(170.0, 20.0, 30.0, 80.0));
        assert_eq!(frame(&tree, bottom), Rect::new(0.0, 85.0, 170.0, 15.0));
        // Not filling: docked left at its desired width
        assert_eq!(frame(&tree, last), Rect::new(0.0, 20.0, 40.0, 65.0));
    }

    #[test]
    fn test_measure_accumulates_insets() {
        let mut tree = LayoutTree::new();
        let panel = tree.create(DockPanel::new());
        let left = tree.create_leaf(RecordingPeer::new(50.0, 30.0));
        let top = tree.create_leaf(RecordingPeer::new(20.0, 10.0));
        tree.add_child(panel, left).unwrap();
        tree.add_child(panel, top).unwrap();
        DockPanel::set_dock(&mut tree, top, Dock::Top).unwrap();

        let desired = tree.measure(panel, Size::new(300.0, 300.0)).unwrap();
        assert_eq!(desired, Size::new(70.0, 30.0));
    }

    #[test]
    fn test_dock_change_invalidates_parent() {
        let mut tree = LayoutTree::new();
        let panel = tree.create(DockPanel::new());
        let leaf = tree.create_leaf(RecordingPeer::new(5.0, 5.0));
        tree.add_child(panel, leaf).unwrap();
        tree.update_layout(panel, Size::new(10.0, 10.0)).unwrap();

        DockPanel::set_dock(&mut tree, leaf, Dock::Left).unwrap();
        assert!(tree.node(panel).unwrap().is_measure_valid());

        DockPanel::set_dock(&mut tree, leaf, Dock::Bottom).unwrap();
        assert_eq!(DockPanel::dock(&tree, leaf), Dock::Bottom);
        assert!(!tree.node(panel).unwrap().is_measure_valid());
    }
}

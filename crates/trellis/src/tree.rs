//! Arena storage for layout nodes and their per-element side tables.

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::canvas::CanvasPosition;
use crate::dock_panel::Dock;
use crate::error::{
    require_length_or_auto, require_non_negative, require_upper_bound, LayoutError,
};
use crate::geometry::{same_length, Rect, Thickness};
use crate::grid::GridPosition;
use crate::layout::{HorizontalAlignment, Leaf, LayoutPolicy, VerticalAlignment, Visibility};
use crate::node::Node;
use crate::options::LayoutOptions;
use crate::peer::NativePeer;

new_key_type! {
    /// Stable identity of a node in a [`LayoutTree`].
    ///
    /// Keys are versioned: once a node is removed its id never refers to a
    /// later node, so side tables keyed by it cannot resurrect stale metadata.
    pub struct NodeId;
}

/// Owner of every layout node.
///
/// Each node has at most one parent; children are kept in insertion order.
/// Positional metadata set through attached-property setters
/// (`Grid::set_row`, `Canvas::set_left`, `DockPanel::set_dock`, ...) lives in
/// secondary maps keyed by [`NodeId`]. They hold no reference to the node and
/// are cleared when the node is removed.
#[derive(Default)]
pub struct LayoutTree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) grid_positions: SecondaryMap<NodeId, GridPosition>,
    pub(crate) docks: SecondaryMap<NodeId, Dock>,
    pub(crate) canvas_positions: SecondaryMap<NodeId, CanvasPosition>,
    pub(crate) options: LayoutOptions,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LayoutOptions) -> Result<Self, LayoutError> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Replace the layout options; every node is invalidated.
    pub fn set_options(&mut self, options: LayoutOptions) -> Result<(), LayoutError> {
        options.validate()?;
        if options != self.options {
            self.options = options;
            for node in self.nodes.values_mut() {
                node.state.measure_dirty = true;
                node.state.arrange_dirty = true;
            }
        }
        Ok(())
    }

    /// Create a detached node driven by `policy`.
    pub fn create<P: LayoutPolicy>(&mut self, policy: P) -> NodeId {
        self.nodes.insert(Node::new(Box::new(policy)))
    }

    /// Create a detached leaf whose intrinsic size comes from `peer`.
    pub fn create_leaf(&mut self, peer: impl NativePeer + 'static) -> NodeId {
        let id = self.create(Leaf);
        self.nodes[id].peer = Some(Box::new(peer));
        id
    }

    /// Pair an existing node (usually a panel) with a native peer.
    pub fn attach_peer(
        &mut self,
        id: NodeId,
        peer: impl NativePeer + 'static,
    ) -> Result<(), LayoutError> {
        self.require_mut(id)?.peer = Some(Box::new(peer));
        self.invalidate_measure(id);
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn require(&self, id: NodeId) -> Result<&Node, LayoutError> {
        self.nodes.get(id).ok_or(LayoutError::NodeNotFound(id))
    }

    pub(crate) fn require_mut(&mut self, id: NodeId) -> Result<&mut Node, LayoutError> {
        self.nodes.get_mut(id).ok_or(LayoutError::NodeNotFound(id))
    }

    // ------------------------------------------------------------------
    // Child collections
    // ------------------------------------------------------------------

    /// Append `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        let len = self.require(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` (0..=len) in `parent`'s children.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), LayoutError> {
        let parent_node = self.require(parent)?;
        let accepts_children = parent_node
            .policy
            .as_ref()
            .is_some_and(|policy| policy.accepts_children());
        if !accepts_children {
            return Err(LayoutError::NotAContainer(parent));
        }
        let len = parent_node.children.len();
        if index > len {
            return Err(LayoutError::OutOfRange {
                what: "child",
                index,
                len,
            });
        }

        if let Some(existing) = self.require(child)?.parent {
            return Err(LayoutError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(LayoutError::Cycle { parent, child });
        }

        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        self.invalidate_measure(child);
        log::trace!("{child:?} inserted into {parent:?} at {index}");
        Ok(())
    }

    /// Remove `child` from `parent` and destroy it with its whole subtree.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        let children = &self.require(parent)?.children;
        if !children.contains(&child) {
            return Err(LayoutError::NodeNotFound(child));
        }
        self.remove_node(child)
    }

    /// Remove the child at `index` from `parent`, destroying its subtree.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId, LayoutError> {
        let child = self.child_at(parent, index)?;
        self.remove_node(child)?;
        Ok(child)
    }

    /// Destroy a node and its subtree, detaching it from its parent first.
    ///
    /// Side-table metadata for every removed node is dropped.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let parent = self.require(id)?.parent;
        if let Some(parent) = parent {
            self.invalidate_measure(parent);
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|&child| child != id);
            }
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.remove(current) {
                pending.extend(node.children);
            }
            self.grid_positions.remove(current);
            self.docks.remove(current);
            self.canvas_positions.remove(current);
        }
        Ok(())
    }

    /// Child at `index`, or a range fault.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Result<NodeId, LayoutError> {
        let children = &self.require(parent)?.children;
        children.get(index).copied().ok_or(LayoutError::OutOfRange {
            what: "child",
            index,
            len: children.len(),
        })
    }

    /// Children in insertion order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// True when `ancestor` is on `id`'s parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    // ------------------------------------------------------------------
    // Visual tree queries
    // ------------------------------------------------------------------

    /// Nearest ancestor whose policy is a `T`.
    pub fn find_ancestor<T: LayoutPolicy>(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.nodes.get(node)?.policy::<T>().is_some() {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// First direct child whose policy is a `T`.
    pub fn find_child<T: LayoutPolicy>(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&child| {
            self.nodes
                .get(child)
                .is_some_and(|node| node.policy::<T>().is_some())
        })
    }

    /// Typed read access to a node's policy.
    pub fn panel<T: LayoutPolicy>(&self, id: NodeId) -> Result<&T, LayoutError> {
        let node = self.require(id)?;
        node.policy::<T>().ok_or(LayoutError::PolicyMismatch {
            node: id,
            expected: std::any::type_name::<T>(),
            actual: node.kind,
        })
    }

    /// Typed write access to a node's policy. Invalidates the node's measure,
    /// since any policy setting may change its size.
    pub fn panel_mut<T: LayoutPolicy>(&mut self, id: NodeId) -> Result<&mut T, LayoutError> {
        let kind = self.require(id)?.kind;
        if self.nodes[id].policy::<T>().is_none() {
            return Err(LayoutError::PolicyMismatch {
                node: id,
                expected: std::any::type_name::<T>(),
                actual: kind,
            });
        }
        self.invalidate_measure(id);
        self.nodes[id]
            .policy_mut::<T>()
            .ok_or(LayoutError::NodeNotFound(id))
    }

    /// Frame of `id` in the coordinate space of the tree's root.
    pub fn absolute_frame(&self, id: NodeId) -> Option<Rect> {
        let mut frame = self.nodes.get(id)?.frame();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            let origin = self.nodes.get(ancestor)?.frame();
            frame = frame.translate(origin.x, origin.y);
            current = self.parent(ancestor);
        }
        Some(frame)
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    /// Mark the node and its ancestors for re-measure (and re-arrange).
    ///
    /// Only sets flags; the work happens in the next layout pass. Repeated
    /// calls are free.
    pub fn invalidate_measure(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get_mut(node_id) else {
                break;
            };
            node.state.measure_dirty = true;
            node.state.arrange_dirty = true;
            current = node.parent;
        }
    }

    /// Mark the node and its ancestors for re-arrange.
    pub fn invalidate_arrange(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get_mut(node_id) else {
                break;
            };
            node.state.arrange_dirty = true;
            current = node.parent;
        }
    }

    /// Invalidate both passes of the node's current parent, if any.
    pub(crate) fn invalidate_parent(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            log::debug!("positional metadata of {id:?} changed; invalidating {parent:?}");
            self.invalidate_measure(parent);
        }
    }

    // ------------------------------------------------------------------
    // Element properties
    // ------------------------------------------------------------------

    /// Explicit width; NaN means auto.
    pub fn set_width(&mut self, id: NodeId, width: f64) -> Result<(), LayoutError> {
        require_length_or_auto("Width", width)?;
        self.update_length(id, width, |node| &mut node.width)
    }

    /// Explicit height; NaN means auto.
    pub fn set_height(&mut self, id: NodeId, height: f64) -> Result<(), LayoutError> {
        require_length_or_auto("Height", height)?;
        self.update_length(id, height, |node| &mut node.height)
    }

    pub fn set_min_width(&mut self, id: NodeId, value: f64) -> Result<(), LayoutError> {
        require_non_negative("MinWidth", value)?;
        self.update_length(id, value, |node| &mut node.min_width)
    }

    pub fn set_min_height(&mut self, id: NodeId, value: f64) -> Result<(), LayoutError> {
        require_non_negative("MinHeight", value)?;
        self.update_length(id, value, |node| &mut node.min_height)
    }

    pub fn set_max_width(&mut self, id: NodeId, value: f64) -> Result<(), LayoutError> {
        require_upper_bound("MaxWidth", value)?;
        self.update_length(id, value, |node| &mut node.max_width)
    }

    pub fn set_max_height(&mut self, id: NodeId, value: f64) -> Result<(), LayoutError> {
        require_upper_bound("MaxHeight", value)?;
        self.update_length(id, value, |node| &mut node.max_height)
    }

    pub fn set_margin(&mut self, id: NodeId, margin: Thickness) -> Result<(), LayoutError> {
        margin.validate("Margin")?;
        let node = self.require_mut(id)?;
        if node.margin != margin {
            node.margin = margin;
            self.invalidate_measure(id);
        }
        Ok(())
    }

    pub fn set_horizontal_alignment(
        &mut self,
        id: NodeId,
        alignment: HorizontalAlignment,
    ) -> Result<(), LayoutError> {
        let node = self.require_mut(id)?;
        if node.horizontal_alignment != alignment {
            node.horizontal_alignment = alignment;
            self.invalidate_arrange(id);
        }
        Ok(())
    }

    pub fn set_vertical_alignment(
        &mut self,
        id: NodeId,
        alignment: VerticalAlignment,
    ) -> Result<(), LayoutError> {
        let node = self.require_mut(id)?;
        if node.vertical_alignment != alignment {
            node.vertical_alignment = alignment;
            self.invalidate_arrange(id);
        }
        Ok(())
    }

    pub fn set_visibility(
        &mut self,
        id: NodeId,
        visibility: Visibility,
    ) -> Result<(), LayoutError> {
        let node = self.require_mut(id)?;
        if node.visibility != visibility {
            node.visibility = visibility;
            self.invalidate_measure(id);
        }
        Ok(())
    }

    fn update_length(
        &mut self,
        id: NodeId,
        value: f64,
        field: impl FnOnce(&mut Node) -> &mut f64,
    ) -> Result<(), LayoutError> {
        let slot = field(self.require_mut(id)?);
        if !same_length(*slot, value) {
            *slot = value;
            self.invalidate_measure(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPeer;
    use crate::{Canvas, DockPanel, Grid, Size};

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = LayoutTree::new();
        let panel = tree.create(Canvas::new());
        let a = tree.create_leaf(RecordingPeer::new(1.0, 1.0));
        let b = tree.create_leaf(RecordingPeer::new(1.0, 1.0));
        let c = tree.create_leaf(RecordingPeer::new(1.0, 1.0));

        tree.add_child(panel, a).unwrap();
        tree.add_child(panel, c).unwrap();
        tree.insert_child(panel, 1, b).unwrap();

        assert_eq!(tree.children(panel), &[a, b, c]);
        assert_eq!(tree.child_at(panel, 2).unwrap(), c);
        assert_eq!(tree.parent(b), Some(panel));
    }

    #[test]
    fn test_child_index_out_of_range() {
        let mut tree = LayoutTree::new();
        let panel = tree.create(Canvas::new());
        let a = tree.create_leaf(RecordingPeer::new(1.0, 1.0));

        assert_eq!(
            tree.child_at(panel, 0),
            Err(LayoutError::OutOfRange {
                what: "child",
                index: 0,
                len: 0
            })
        );
        assert!(matches!(
            tree.insert_child(panel, 3, a),
            Err(LayoutError::OutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_single_parent() {
        let mut tree = LayoutTree::new();
        let first = tree.create(Canvas::new());
        let second = tree.create(Canvas::new());
        let leaf = tree.create_leaf(RecordingPeer::new(1.0, 1.0));

        tree.add_child(first, leaf).unwrap();
        assert_eq!(
            tree.add_child(second, leaf),
            Err(LayoutError::AlreadyParented {
                child: leaf,
                parent: first
            })
        );
    }

    #[test]
    fn test_cycles_and_leaves_are_rejected() {
        let mut tree = LayoutTree::new();
        let outer = tree.create(Canvas::new());
        let inner = tree.create(Canvas::new());
        let leaf = tree.create_leaf(RecordingPeer::new(1.0, 1.0));
        let other = tree.create_leaf(RecordingPeer::new(1.0, 1.0));

        tree.add_child(outer, inner).unwrap();
        assert!(matches!(
            tree.add_child(inner, outer),
            Err(LayoutError::Cycle { .. })
        ));
        assert!(matches!(
            tree.add_child(outer, outer),
            Err(LayoutError::Cycle { .. })
        ));
        assert_eq!(
            tree.add_child(leaf, other),
            Err(LayoutError::NotAContainer(leaf))
        );
    }

    #[test]
    fn test_remove_destroys_subtree_and_side_tables() {
        let mut tree = LayoutTree::new();
        let root = tree.create(Canvas::new());
        let panel = tree.create(Grid::new());
        let leaf = tree.create_leaf(RecordingPeer::new(1.0, 1.0));
        tree.add_child(root, panel).unwrap();
        tree.add_child(panel, leaf).unwrap();
        Grid::set_row(&mut tree, leaf, 2).unwrap();
        Canvas::set_left(&mut tree, panel, 4.0).unwrap();

        tree.update_layout(root, Size::new(10.0, 10.0)).unwrap();
        tree.remove_child(root, panel).unwrap();

        assert!(!tree.contains(panel));
        assert!(!tree.contains(leaf));
        assert!(tree.children(root).is_empty());
        assert!(tree.grid_positions.get(leaf).is_none());
        assert!(tree.canvas_positions.get(panel).is_none());
        assert!(!tree.node(root).unwrap().is_measure_valid());

        // A fresh node never inherits stale metadata
        let fresh = tree.create_leaf(RecordingPeer::new(1.0, 1.0));
        assert_eq!(Grid::row(&tree, fresh), 0);
    }

    #[test]
    fn test_invalidation_reaches_ancestors() {
        let mut tree = LayoutTree::new();
        let root = tree.create(Canvas::new());
        let mid = tree.create(DockPanel::new());
        let leaf = tree.create_leaf(RecordingPeer::new(5.0, 5.0));
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        tree.update_layout(root, Size::new(50.0, 50.0)).unwrap();
        assert!(tree.node(root).unwrap().is_measure_valid());

        tree.set_height(leaf, 12.0).unwrap();
        assert!(!tree.node(mid).unwrap().is_measure_valid());
        assert!(!tree.node(root).unwrap().is_measure_valid());

        tree.update_layout(root, Size::new(50.0, 50.0)).unwrap();
        tree.set_vertical_alignment(leaf, VerticalAlignment::Top).unwrap();
        assert!(tree.node(root).unwrap().is_measure_valid());
        assert!(!tree.node(root).unwrap().is_arrange_valid());
    }

    #[test]
    fn test_setters_validate() {
        let mut tree = LayoutTree::new();
        let leaf = tree.create_leaf(RecordingPeer::new(1.0, 1.0));

        assert!(tree.set_width(leaf, -1.0).is_err());
        assert!(tree.set_width(leaf, f64::INFINITY).is_err());
        assert!(tree.set_min_width(leaf, f64::NAN).is_err());
        assert!(tree.set_max_height(leaf, -0.5).is_err());
        assert!(tree.set_max_height(leaf, f64::INFINITY).is_ok());
        assert!(tree
            .set_margin(leaf, Thickness::new(f64::NAN, 0.0, 0.0, 0.0))
            .is_err());

        // Rejected values leave the node untouched
        assert!(tree.node(leaf).unwrap().width().is_nan());
    }

    #[test]
    fn test_typed_panel_access() {
        let mut tree = LayoutTree::new();
        let grid = tree.create(Grid::new());
        let leaf = tree.create_leaf(RecordingPeer::new(1.0, 1.0));
        tree.add_child(grid, leaf).unwrap();

        assert!(tree.panel::<Grid>(grid).is_ok());
        assert!(matches!(
            tree.panel::<Canvas>(grid),
            Err(LayoutError::PolicyMismatch { actual: "Grid", .. })
        ));
        assert_eq!(tree.find_ancestor::<Grid>(leaf), Some(grid));
        assert_eq!(tree.find_child::<Leaf>(grid), Some(leaf));
        assert_eq!(tree.find_ancestor::<Canvas>(leaf), None);
    }

    #[test]
    fn test_unknown_node() {
        let mut tree = LayoutTree::new();
        let leaf = tree.create_leaf(RecordingPeer::new(1.0, 1.0));
        tree.remove_node(leaf).unwrap();

        assert_eq!(tree.set_width(leaf, 3.0), Err(LayoutError::NodeNotFound(leaf)));
        assert_eq!(
            tree.update_layout(leaf, Size::INFINITE),
            Err(LayoutError::NodeNotFound(leaf))
        );
        assert!(tree.children(leaf).is_empty());
    }
}

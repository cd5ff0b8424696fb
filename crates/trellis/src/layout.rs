//! The two-pass measure/arrange protocol.
//!
//! [`LayoutTree::measure`] and [`LayoutTree::arrange`] are the sealed drivers:
//! they apply visibility, explicit sizes, min/max clamping, margins and
//! alignment, and delegate the policy-specific part to a node's
//! [`LayoutPolicy`]. Policies never see margins or their own min/max; they
//! only receive the already-constrained box.

use std::any::Any;

use crate::canvas::CanvasPosition;
use crate::dock_panel::Dock;
use crate::error::LayoutError;
use crate::geometry::{Rect, Size};
use crate::grid::GridPosition;
use crate::tree::{LayoutTree, NodeId};

/// Horizontal placement of a node within the slot its parent offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
    /// Fill the slot (subject to explicit width and min/max)
    #[default]
    Stretch,
}

/// Vertical placement of a node within the slot its parent offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    /// Fill the slot (subject to explicit height and min/max)
    #[default]
    Stretch,
}

impl HorizontalAlignment {
    /// Fraction of the leftover space placed before the node.
    pub(crate) fn factor(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center | Self::Stretch => 0.5,
            Self::Right => 1.0,
        }
    }
}

impl VerticalAlignment {
    pub(crate) fn factor(self) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center | Self::Stretch => 0.5,
            Self::Bottom => 1.0,
        }
    }
}

/// Whether a node is drawn and whether it takes part in layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    /// Not drawn, but still occupies its space
    Hidden,
    /// Not drawn and occupies no space
    Collapsed,
}

/// Primary axis for stacking and wrapping panels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Layout strategy of a node.
///
/// Implementors provide the two override points of the protocol. The
/// `available` size handed to [`measure_override`](Self::measure_override)
/// and the `final_size` handed to [`arrange_override`](Self::arrange_override)
/// already have margins removed, explicit sizes applied and min/max clamps
/// enforced.
pub trait LayoutPolicy: Any {
    /// Diagnostic name ("Grid", "DockPanel", ...)
    fn kind(&self) -> &'static str;

    /// Measure children and return the size this node wants.
    ///
    /// Must return a finite size.
    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size;

    /// Position children inside `final_size` and return the size used.
    fn arrange_override(&mut self, cx: &mut LayoutContext<'_>, final_size: Size) -> Size;

    /// Leaves return false and reject `add_child`.
    fn accepts_children(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Policy for a leaf node: the native peer decides the intrinsic size.
#[derive(Clone, Copy, Debug, Default)]
pub struct Leaf;

impl LayoutPolicy for Leaf {
    fn kind(&self) -> &'static str {
        "Leaf"
    }

    fn measure_override(&mut self, cx: &mut LayoutContext<'_>, available: Size) -> Size {
        cx.measure_peer(available).unwrap_or(Size::ZERO)
    }

    fn arrange_override(&mut self, _cx: &mut LayoutContext<'_>, final_size: Size) -> Size {
        final_size
    }

    fn accepts_children(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a policy may touch while it runs: its own children and their
/// side-table metadata.
pub struct LayoutContext<'a> {
    tree: &'a mut LayoutTree,
    node: NodeId,
}

impl<'a> LayoutContext<'a> {
    fn new(tree: &'a mut LayoutTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The node whose policy is running
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Read-only view of the whole tree
    pub fn tree(&self) -> &LayoutTree {
        self.tree
    }

    /// Children in insertion order (copied, so the tree can be mutated while iterating)
    pub fn children(&self) -> Vec<NodeId> {
        self.tree.children(self.node).to_vec()
    }

    /// Run the sealed measure on a child and return its desired size.
    pub fn measure_child(&mut self, child: NodeId, available: Size) -> Size {
        debug_assert_eq!(self.tree.parent(child), Some(self.node));
        self.tree.measure_node(child, available)
    }

    /// Run the sealed arrange on a child with a slot in this node's coordinates.
    pub fn arrange_child(&mut self, child: NodeId, slot: Rect) {
        debug_assert_eq!(self.tree.parent(child), Some(self.node));
        self.tree.arrange_node(child, slot);
    }

    /// Last desired size of a child, margins included
    pub fn desired_size(&self, child: NodeId) -> Size {
        self.tree
            .node(child)
            .map(|node| node.desired_size())
            .unwrap_or_default()
    }

    pub fn is_collapsed(&self, child: NodeId) -> bool {
        self.tree.node(child).is_some_and(|node| node.is_collapsed())
    }

    pub fn grid_position(&self, child: NodeId) -> GridPosition {
        self.tree.grid_positions.get(child).copied().unwrap_or_default()
    }

    pub fn dock(&self, child: NodeId) -> Dock {
        self.tree.docks.get(child).copied().unwrap_or_default()
    }

    pub fn canvas_position(&self, child: NodeId) -> CanvasPosition {
        self.tree
            .canvas_positions
            .get(child)
            .copied()
            .unwrap_or_default()
    }

    /// Ask this node's native peer for its intrinsic size.
    pub fn measure_peer(&mut self, constraints: Size) -> Option<Size> {
        let node = self.tree.nodes.get_mut(self.node)?;
        node.peer.as_mut().map(|peer| peer.measure(constraints))
    }
}

impl LayoutTree {
    /// Bring the subtree under `root` up to date for the given viewport.
    ///
    /// Measures with `available`, then arranges at the origin using the
    /// available size on finite axes and the desired size on unconstrained
    /// ones. Nodes whose cached results are still valid are skipped, so any
    /// number of invalidations between two calls cost one recomputation.
    pub fn update_layout(&mut self, root: NodeId, available: Size) -> Result<(), LayoutError> {
        self.require(root)?;
        log::debug!("layout pass for {root:?} in {available:?}");

        let desired = self.measure_node(root, available);
        let width = if available.width.is_finite() {
            available.width
        } else {
            desired.width
        };
        let height = if available.height.is_finite() {
            available.height
        } else {
            desired.height
        };
        self.arrange_node(root, Rect::new(0.0, 0.0, width, height));
        Ok(())
    }

    /// Sealed measure: compute and cache the node's desired size.
    pub fn measure(&mut self, id: NodeId, available: Size) -> Result<Size, LayoutError> {
        self.require(id)?;
        Ok(self.measure_node(id, available))
    }

    /// Sealed arrange: place the node inside `slot` (parent coordinates).
    pub fn arrange(&mut self, id: NodeId, slot: Rect) -> Result<(), LayoutError> {
        self.require(id)?;
        self.arrange_node(id, slot);
        Ok(())
    }

    /// # Panics
    /// Panics if the node's measure override returns a NaN or infinite size.
    pub(crate) fn measure_node(&mut self, id: NodeId, available: Size) -> Size {
        let Some(node) = self.nodes.get_mut(id) else {
            return Size::ZERO;
        };

        if !node.state.measure_dirty && node.state.last_available == Some(available) {
            return node.state.desired_size;
        }

        // A new desired size may move or resize the frame even when the slot
        // stays the same
        node.state.arrange_dirty = true;

        if node.is_collapsed() {
            node.state.desired_size = Size::ZERO;
            node.state.measure_dirty = false;
            node.state.last_available = Some(available);
            return Size::ZERO;
        }

        let margin = node.margin;
        let constraint = node.constrain(available.deflate(margin));
        let Some(mut policy) = node.policy.take() else {
            log::warn!("re-entrant measure of {id:?} ignored");
            return node.state.desired_size;
        };

        let raw = {
            let mut cx = LayoutContext::new(self, id);
            policy.measure_override(&mut cx, constraint)
        };

        let node = &mut self.nodes[id];
        node.policy = Some(policy);

        if !raw.is_finite() {
            panic!(
                "{} measure override for {id:?} returned {raw:?}; desired sizes must be finite",
                node.kind
            );
        }

        let desired = node.clamp_size(raw).inflate(margin);
        log::trace!(
            "measure {} {id:?}: available={available:?} constraint={constraint:?} \
             desired={desired:?}",
            node.kind
        );

        node.state.desired_size = desired;
        node.state.measure_dirty = false;
        node.state.last_available = Some(available);
        desired
    }

    pub(crate) fn arrange_node(&mut self, id: NodeId, slot: Rect) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };

        if node.state.measure_dirty {
            let available = node.state.last_available.unwrap_or(slot.size());
            self.measure_node(id, available);
        }

        let rounding = self.options.layout_rounding.then_some(self.options.scale_factor);
        let node = &mut self.nodes[id];
        if !node.state.arrange_dirty && node.state.last_slot == Some(slot) {
            return;
        }

        let inner = slot.deflate(node.margin);

        if node.is_collapsed() {
            let frame = Rect::new(inner.x, inner.y, 0.0, 0.0);
            commit_frame(node, frame);
            node.state.render_size = Size::ZERO;
            node.state.arrange_dirty = false;
            node.state.last_slot = Some(slot);
            return;
        }

        let mut constraint = node.constrain(inner.size());
        // Auto-sized axes that do not stretch get their desired size, so
        // alignment has room to move them.
        let measured = node.state.desired_size.deflate(node.margin);
        if node.width.is_nan() && node.horizontal_alignment != HorizontalAlignment::Stretch {
            constraint.width = constraint.width.min(measured.width);
        }
        if node.height.is_nan() && node.vertical_alignment != VerticalAlignment::Stretch {
            constraint.height = constraint.height.min(measured.height);
        }

        let Some(mut policy) = node.policy.take() else {
            log::warn!("re-entrant arrange of {id:?} ignored");
            return;
        };

        let arranged = {
            let mut cx = LayoutContext::new(self, id);
            policy.arrange_override(&mut cx, constraint)
        };

        let node = &mut self.nodes[id];
        node.policy = Some(policy);

        let mut render = node.clamp_size(arranged);
        if node.horizontal_alignment == HorizontalAlignment::Stretch {
            render.width = constraint.width;
        }
        if node.vertical_alignment == VerticalAlignment::Stretch {
            render.height = constraint.height;
        }

        let x = inner.x
            + (inner.width - render.width).max(0.0) * node.horizontal_alignment.factor();
        let y = inner.y
            + (inner.height - render.height).max(0.0) * node.vertical_alignment.factor();

        let mut frame = Rect::new(x, y, render.width, render.height);
        if let Some(scale_factor) = rounding {
            frame = frame.round_to_pixels(scale_factor);
        }

        log::trace!("arrange {} {id:?}: slot={slot:?} frame={frame:?}", node.kind);

        commit_frame(node, frame);
        node.state.render_size = render;
        node.state.arrange_dirty = false;
        node.state.last_slot = Some(slot);
    }
}

fn commit_frame(node: &mut crate::node::Node, frame: Rect) {
    node.state.frame = frame;
    if let Some(peer) = node.peer.as_mut() {
        peer.set_frame(frame);
    }
}

use crate::geometry::{clamp_min_max, Rect, Size, Thickness};
use crate::layout::{HorizontalAlignment, LayoutPolicy, VerticalAlignment, Visibility};
use crate::peer::NativePeer;
use crate::tree::NodeId;

/// Cached results of the last measure/arrange pass plus the dirty flags.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LayoutState {
    /// Size requested during the last measure, margins included
    pub(crate) desired_size: Size,
    /// Size produced by the last arrange, margins excluded
    pub(crate) render_size: Size,
    /// Parent-relative frame committed by the last arrange
    pub(crate) frame: Rect,
    pub(crate) measure_dirty: bool,
    pub(crate) arrange_dirty: bool,
    /// Constraint the cached `desired_size` was computed for
    pub(crate) last_available: Option<Size>,
    /// Slot the cached `frame` was computed for
    pub(crate) last_slot: Option<Rect>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            desired_size: Size::ZERO,
            render_size: Size::ZERO,
            frame: Rect::ZERO,
            measure_dirty: true,
            arrange_dirty: true,
            last_available: None,
            last_slot: None,
        }
    }
}

/// A layout node stored in a [`LayoutTree`](crate::LayoutTree).
///
/// Nodes are either leaves wrapping a native peer or panels whose
/// [`LayoutPolicy`] positions their children. Properties are read here and
/// written through the tree's validating setters, which also schedule the
/// matching invalidation.
pub struct Node {
    /// Explicit width (NaN = auto)
    pub(crate) width: f64,
    /// Explicit height (NaN = auto)
    pub(crate) height: f64,
    pub(crate) min_width: f64,
    pub(crate) min_height: f64,
    pub(crate) max_width: f64,
    pub(crate) max_height: f64,
    /// Margin outside the node
    pub(crate) margin: Thickness,
    /// Horizontal placement inside the slot offered by the parent
    ///
    /// Default: `HorizontalAlignment::Stretch`
    pub(crate) horizontal_alignment: HorizontalAlignment,
    /// Vertical placement inside the slot offered by the parent
    ///
    /// Default: `VerticalAlignment::Stretch`
    pub(crate) vertical_alignment: VerticalAlignment,
    pub(crate) visibility: Visibility,
    pub(crate) parent: Option<NodeId>,
    /// Children in insertion order
    pub(crate) children: Vec<NodeId>,
    /// Taken out while the policy runs, so it is `None` only mid-pass
    pub(crate) policy: Option<Box<dyn LayoutPolicy>>,
    pub(crate) kind: &'static str,
    pub(crate) peer: Option<Box<dyn NativePeer>>,
    pub(crate) state: LayoutState,
}

impl Node {
    pub(crate) fn new(policy: Box<dyn LayoutPolicy>) -> Self {
        Self {
            width: f64::NAN,
            height: f64::NAN,
            min_width: 0.0,
            min_height: 0.0,
            max_width: f64::INFINITY,
            max_height: f64::INFINITY,
            margin: Thickness::ZERO,
            horizontal_alignment: HorizontalAlignment::default(),
            vertical_alignment: VerticalAlignment::default(),
            visibility: Visibility::default(),
            parent: None,
            children: Vec::new(),
            kind: policy.kind(),
            policy: Some(policy),
            peer: None,
            state: LayoutState::default(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn min_width(&self) -> f64 {
        self.min_width
    }

    pub fn min_height(&self) -> f64 {
        self.min_height
    }

    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn margin(&self) -> Thickness {
        self.margin
    }

    pub fn horizontal_alignment(&self) -> HorizontalAlignment {
        self.horizontal_alignment
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Collapsed nodes occupy no layout space.
    pub fn is_collapsed(&self) -> bool {
        self.visibility == Visibility::Collapsed
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Diagnostic name of the node's layout policy ("Grid", "Leaf", ...)
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Size computed by the last measure, margins included
    pub fn desired_size(&self) -> Size {
        self.state.desired_size
    }

    /// Size computed by the last arrange, margins excluded
    pub fn render_size(&self) -> Size {
        self.state.render_size
    }

    /// Parent-relative frame committed by the last arrange
    pub fn frame(&self) -> Rect {
        self.state.frame
    }

    pub fn is_measure_valid(&self) -> bool {
        !self.state.measure_dirty
    }

    pub fn is_arrange_valid(&self) -> bool {
        !self.state.arrange_dirty
    }

    /// Downcast the node's policy.
    ///
    /// Returns `None` for a different policy type, and while the policy is
    /// running its own measure/arrange override.
    pub fn policy<T: LayoutPolicy>(&self) -> Option<&T> {
        self.policy.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub(crate) fn policy_mut<T: LayoutPolicy>(&mut self) -> Option<&mut T> {
        self.policy.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Per-axis constraint box: the explicit size when set, otherwise the
    /// offered size, clamped into `[min, max]`.
    pub(crate) fn constrain(&self, offered: Size) -> Size {
        Size::new(
            resolve_axis(self.width, offered.width, self.min_width, self.max_width),
            resolve_axis(self.height, offered.height, self.min_height, self.max_height),
        )
    }

    /// Clamp a size produced by an override into `[min, max]`, preferring
    /// explicit dimensions.
    pub(crate) fn clamp_size(&self, size: Size) -> Size {
        Size::new(
            resolve_axis(self.width, size.width, self.min_width, self.max_width),
            resolve_axis(self.height, size.height, self.min_height, self.max_height),
        )
    }
}

fn resolve_axis(explicit: f64, offered: f64, min: f64, max: f64) -> f64 {
    let value = if explicit.is_nan() { offered } else { explicit };
    clamp_min_max(value, min, max)
}

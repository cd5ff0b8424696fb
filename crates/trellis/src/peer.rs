//! Boundary with the platform's native widgets.
//!
//! The layout engine treats a native peer as a black box: it asks for an
//! intrinsic size under some constraints and later commits a final frame.
//! Platform backends implement [`NativePeer`]; the core never depends on any
//! specific widget toolkit.

use crate::geometry::{Rect, Size};

/// A platform widget paired with a layout node.
pub trait NativePeer {
    /// Intrinsic content size of the widget given the constraints.
    ///
    /// Constraints may be infinite on either axis. The returned size must be
    /// finite; the sealed measure driver panics otherwise.
    fn measure(&mut self, constraints: Size) -> Size;

    /// Commit the final placement, in parent-relative coordinates.
    fn set_frame(&mut self, frame: Rect);
}

/// Peer with a constant intrinsic size that remembers its last frame.
///
/// Useful for headless hosts and for spacer widgets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedSizePeer {
    pub size: Size,
    pub frame: Rect,
}

impl FixedSizePeer {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            frame: Rect::ZERO,
        }
    }
}

impl NativePeer for FixedSizePeer {
    fn measure(&mut self, _constraints: Size) -> Size {
        self.size
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

/// Peer whose intrinsic size is computed by a closure, e.g. wrapped text
/// whose height depends on the offered width.
pub struct MeasureFn<F>(pub F);

impl<F> NativePeer for MeasureFn<F>
where
    F: FnMut(Size) -> Size,
{
    fn measure(&mut self, constraints: Size) -> Size {
        (self.0)(constraints)
    }

    fn set_frame(&mut self, _frame: Rect) {}
}

//! Geometry value types shared by every layout strategy.
//!
//! All lengths are `f64` layout units. `f64::NAN` is the "unspecified / auto"
//! sentinel and `f64::INFINITY` means "unconstrained".

use crate::error::LayoutError;

/// Clamp `value` into `[min, max]`. When the two bounds disagree, `min` wins.
#[inline]
pub(crate) fn clamp_min_max(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// NaN-aware equality used by property setters to detect real changes.
#[inline]
pub(crate) fn same_length(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

/// Width and height of a box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[repr(C)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unconstrained on both axes.
    pub const INFINITE: Self = Self::new(f64::INFINITY, f64::INFINITY);

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when neither component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }

    /// Shrink by the thickness on each side, flooring at zero.
    pub fn deflate(&self, thickness: Thickness) -> Self {
        Self {
            width: (self.width - thickness.horizontal()).max(0.0),
            height: (self.height - thickness.vertical()).max(0.0),
        }
    }

    /// Grow by the thickness on each side.
    pub fn inflate(&self, thickness: Thickness) -> Self {
        Self {
            width: self.width + thickness.horizontal(),
            height: self.height + thickness.vertical(),
        }
    }

    /// Component-wise minimum.
    pub fn min(&self, other: Size) -> Self {
        Self {
            width: self.width.min(other.width),
            height: self.height.min(other.height),
        }
    }

    /// Component-wise maximum.
    pub fn max(&self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

/// A point in parent-relative layout space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[repr(C)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from(arr: [f64; 2]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
        }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Final on-screen placement: origin plus size.
///
/// Width and height are clamped non-negative by [`Rect::new`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[repr(C)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if a point is inside this rectangle (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Inset by the thickness on each side; the size never goes negative.
    pub fn deflate(&self, thickness: Thickness) -> Self {
        Self::new(
            self.x + thickness.left,
            self.y + thickness.top,
            self.width - thickness.horizontal(),
            self.height - thickness.vertical(),
        )
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Snap origin and far edge to the device pixel grid.
    pub(crate) fn round_to_pixels(&self, scale_factor: f64) -> Self {
        let snap = |value: f64| (value * scale_factor).round() / scale_factor;
        let x = snap(self.x);
        let y = snap(self.y);
        Self::new(x, y, snap(self.right()) - x, snap(self.bottom()) - y)
    }
}

/// Margin, padding or border widths on the four sides of a box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[repr(C)]
pub struct Thickness {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Thickness {
    pub const ZERO: Self = Self::uniform(0.0);

    /// Create a thickness from individual left, top, right, bottom values
    ///
    /// ```
    /// # use trellis::Thickness;
    /// let t = Thickness::new(1.0, 2.0, 3.0, 4.0);
    /// assert_eq!(t.left, 1.0);
    /// assert_eq!(t.bottom, 4.0);
    /// ```
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same value on all sides
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Symmetric horizontal (left/right) and vertical (top/bottom) values
    ///
    /// ```
    /// # use trellis::Thickness;
    /// let t = Thickness::symmetric(10.0, 20.0);
    /// assert_eq!(t.left, 10.0);
    /// assert_eq!(t.right, 10.0);
    /// assert_eq!(t.top, 20.0);
    /// assert_eq!(t.bottom, 20.0);
    /// ```
    pub const fn symmetric(horizontal: f64, vertical: f64) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Reject NaN and infinite components.
    pub fn validate(&self, property: &'static str) -> Result<(), LayoutError> {
        for value in [self.left, self.top, self.right, self.bottom] {
            if !value.is_finite() {
                return Err(LayoutError::InvalidValue {
                    property,
                    value,
                    expected: "a finite thickness",
                });
            }
        }
        Ok(())
    }
}

impl std::ops::Add for Thickness {
    type Output = Thickness;

    fn add(self, rhs: Thickness) -> Thickness {
        Thickness::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

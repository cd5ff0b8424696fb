use trellis_macros::WithBuilders;

use crate::error::LayoutError;

/// Tree-wide layout settings.
///
/// ```
/// use trellis::LayoutOptions;
///
/// let options = LayoutOptions::default()
///     .with_layout_rounding(true)
///     .with_scale_factor(2.0);
/// assert_eq!(options.scale_factor, 2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, WithBuilders)]
pub struct LayoutOptions {
    /// Snap committed frames to device pixels
    pub layout_rounding: bool,
    /// Device pixels per layout unit; only used by rounding
    pub scale_factor: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            layout_rounding: false,
            scale_factor: 1.0,
        }
    }
}

impl LayoutOptions {
    pub(crate) fn validate(&self) -> Result<(), LayoutError> {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            Ok(())
        } else {
            Err(LayoutError::InvalidValue {
                property: "scale_factor",
                value: self.scale_factor,
                expected: "a finite, positive number",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutTree;

    #[test]
    fn test_scale_factor_must_be_positive() {
        let options = LayoutOptions::default().with_scale_factor(0.0);
        assert!(options.validate().is_err());
        assert!(LayoutTree::with_options(options).is_err());

        let mut tree = LayoutTree::new();
        assert!(tree
            .set_options(LayoutOptions::default().with_scale_factor(f64::NAN))
            .is_err());
        assert_eq!(*tree.options(), LayoutOptions::default());
    }
}

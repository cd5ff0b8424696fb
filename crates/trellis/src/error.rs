//! Layout error types.

use thiserror::Error;

use crate::tree::NodeId;

/// Faults raised by setters and tree operations.
///
/// Every variant is reported at the call that introduced the bad value; the
/// measure and arrange passes themselves never return errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("invalid {property}: expected {expected}, got {value}")]
    InvalidValue {
        property: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("{what} index {index} is out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("invalid {property}: span must be at least 1, got {value}")]
    InvalidSpan { property: &'static str, value: usize },

    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    #[error("node {child:?} already belongs to {parent:?}")]
    AlreadyParented { child: NodeId, parent: NodeId },

    #[error("adding {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("node {0:?} cannot contain children")]
    NotAContainer(NodeId),

    #[error("node {node:?} is a {actual}, not a {expected}")]
    PolicyMismatch {
        node: NodeId,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Reject NaN, infinity and negative values.
pub(crate) fn require_non_negative(property: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidValue {
            property,
            value,
            expected: "a finite, non-negative number",
        })
    }
}

/// Like [`require_non_negative`] but NaN (auto) is allowed.
pub(crate) fn require_length_or_auto(
    property: &'static str,
    value: f64,
) -> Result<(), LayoutError> {
    if value.is_nan() || (value.is_finite() && value >= 0.0) {
        Ok(())
    } else {
        Err(LayoutError::InvalidValue {
            property,
            value,
            expected: "a finite, non-negative number or NaN (auto)",
        })
    }
}

/// Upper bounds: non-negative, not NaN, `+inf` allowed.
pub(crate) fn require_upper_bound(property: &'static str, value: f64) -> Result<(), LayoutError> {
    if !value.is_nan() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidValue {
            property,
            value,
            expected: "a non-negative number or infinity",
        })
    }
}

/// Coordinates: any finite value.
pub(crate) fn require_finite(property: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LayoutError::InvalidValue {
            property,
            value,
            expected: "a finite number",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validators() {
        assert!(require_non_negative("MinWidth", 0.0).is_ok());
        assert!(require_non_negative("MinWidth", -1.0).is_err());
        assert!(require_non_negative("MinWidth", f64::NAN).is_err());

        assert!(require_length_or_auto("Width", f64::NAN).is_ok());
        assert!(require_length_or_auto("Width", f64::INFINITY).is_err());

        assert!(require_upper_bound("MaxWidth", f64::INFINITY).is_ok());
        assert!(require_upper_bound("MaxWidth", f64::NAN).is_err());

        assert!(require_finite("Left", -12.5).is_ok());
        assert!(require_finite("Left", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_error_message_names_property() {
        let err = require_non_negative("MinHeight", -3.0).unwrap_err();
        assert!(err.to_string().contains("MinHeight"));
    }
}

use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

/// One detected step: heading plus stride length.
///
/// Heading follows the navigation convention used throughout the crate:
/// 0 rad points along +y and the angle grows toward +x, so one stride moves
/// the walker by `(stride * sin(heading), stride * cos(heading))`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StrideEvent {
    pub heading_rad: f64,
    pub stride_m: f64,
}

impl StrideEvent {
    /// Validate and build a stride event.
    ///
    /// Rejects non-finite headings and non-positive or non-finite stride
    /// lengths at the boundary; estimators only ever see valid events.
    pub fn new(heading_rad: f64, stride_m: f64) -> Result<Self, EstimatorError> {
        if !heading_rad.is_finite() {
            return Err(EstimatorError::InvalidHeading(heading_rad));
        }
        if !stride_m.is_finite() || stride_m <= 0.0 {
            return Err(EstimatorError::InvalidStrideLength(stride_m));
        }
        Ok(StrideEvent {
            heading_rad,
            stride_m,
        })
    }
}

/// Round a position to 3 decimal places (millimeters) for presentation
/// surfaces. Internal state keeps full precision.
pub fn display_position(position: (f64, f64)) -> (f64, f64) {
    (
        (position.0 * 1000.0).round() / 1000.0,
        (position.1 * 1000.0).round() / 1000.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_stride() {
        let stride = StrideEvent::new(0.5, 0.7).unwrap();
        assert_eq!(stride.heading_rad, 0.5);
        assert_eq!(stride.stride_m, 0.7);
    }

    #[test]
    fn test_rejects_zero_and_negative_stride() {
        assert!(StrideEvent::new(0.0, 0.0).is_err());
        assert!(StrideEvent::new(0.0, -0.7).is_err());
    }

    #[test]
    fn test_rejects_non_finite_input() {
        assert!(StrideEvent::new(f64::NAN, 0.7).is_err());
        assert!(StrideEvent::new(f64::INFINITY, 0.7).is_err());
        assert!(StrideEvent::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_display_rounding() {
        assert_eq!(display_position((1.23456, 7.89012)), (1.235, 7.890));
        assert_eq!(display_position((2.0, 4.0)), (2.0, 4.0));
    }
}

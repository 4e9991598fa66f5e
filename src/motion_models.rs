//! Likelihood terms combined by the MAP filter.
//!
//! All functions are pure and return non-negative densities. None of them
//! need to integrate to one: the caller combines them in log space, so only
//! relative magnitude matters.

use nalgebra::Vector2;

/// Project a position forward by one stride under the navigation
/// convention: heading 0 points along +y and grows toward +x.
pub fn project_forward(prev: (f64, f64), heading_rad: f64, stride_m: f64) -> (f64, f64) {
    (
        prev.0 + stride_m * heading_rad.sin(),
        prev.1 + stride_m * heading_rad.cos(),
    )
}

/// Stride-circle likelihood: Gaussian in the distance walked, centered at
/// the measured stride length.
///
/// Stride lengths from step detection are accurate while direction is not,
/// so this term constrains the candidate to a ring around the previous
/// position without preferring any bearing.
pub fn stride_circle_likelihood(
    candidate: (f64, f64),
    prev: (f64, f64),
    stride_m: f64,
    sigma_stride: f64,
) -> f64 {
    let offset = Vector2::new(candidate.0 - prev.0, candidate.1 - prev.1);
    let z = (offset.norm() - stride_m) / sigma_stride;
    (-0.5 * z * z).exp() / (sigma_stride * (2.0 * std::f64::consts::PI).sqrt())
}

/// Heading likelihood: isotropic 2-D Gaussian centered at the point the
/// measured heading predicts.
///
/// `sigma_heading` is kept large on purpose; heading trust lives in the
/// orientation pipeline upstream, and an overconfident term here would
/// drag estimates through walls.
pub fn heading_likelihood(
    candidate: (f64, f64),
    prev: (f64, f64),
    heading_rad: f64,
    stride_m: f64,
    sigma_heading: f64,
) -> f64 {
    let predicted = project_forward(prev, heading_rad, stride_m);
    isotropic_gaussian(candidate, predicted, sigma_heading)
}

/// Continuity likelihood: weak isotropic Gaussian around the previous
/// posterior estimate. Meter-scale sigma, enough to smooth without
/// fighting the floor plan or the heading evidence.
pub fn continuity_likelihood(
    candidate: (f64, f64),
    previous_estimate: (f64, f64),
    sigma: f64,
) -> f64 {
    isotropic_gaussian(candidate, previous_estimate, sigma)
}

/// Extended motion-history prior, uniform.
///
/// Velocity extrapolation from the position history is intentionally
/// disabled: it fights direction changes, and direction already comes from
/// the heading term. Kept as a named factor so the posterior's shape stays
/// visible where it is combined.
pub fn motion_history_prior(_candidate: (f64, f64)) -> f64 {
    1.0
}

fn isotropic_gaussian(point: (f64, f64), mean: (f64, f64), sigma: f64) -> f64 {
    let offset = Vector2::new(point.0 - mean.0, point.1 - mean.1);
    let variance = sigma * sigma;
    (-0.5 * offset.norm_squared() / variance).exp()
        / (2.0 * std::f64::consts::PI * variance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_projection_heading_zero_moves_along_y() {
        let next = project_forward((2.0, 4.0), 0.0, 0.7);
        assert_relative_eq!(next.0, 2.0, epsilon = 1e-12);
        assert_relative_eq!(next.1, 4.7, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_quarter_turn_moves_along_x() {
        let next = project_forward((2.0, 4.0), FRAC_PI_2, 0.7);
        assert_relative_eq!(next.0, 2.7, epsilon = 1e-12);
        assert_relative_eq!(next.1, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_reverse_heading() {
        let next = project_forward((2.0, 4.0), PI, 0.7);
        assert_relative_eq!(next.0, 2.0, epsilon = 1e-12);
        assert_relative_eq!(next.1, 3.3, epsilon = 1e-12);
    }

    #[test]
    fn test_stride_circle_peaks_on_the_ring() {
        let prev = (5.0, 5.0);
        let on_ring = stride_circle_likelihood((5.0, 5.7), prev, 0.7, 0.1);
        let inside = stride_circle_likelihood((5.0, 5.3), prev, 0.7, 0.1);
        let outside = stride_circle_likelihood((5.0, 6.4), prev, 0.7, 0.1);
        assert!(on_ring > inside);
        assert!(on_ring > outside);
    }

    #[test]
    fn test_stride_circle_is_direction_agnostic() {
        let prev = (5.0, 5.0);
        let north = stride_circle_likelihood((5.0, 5.7), prev, 0.7, 0.1);
        let east = stride_circle_likelihood((5.7, 5.0), prev, 0.7, 0.1);
        assert_relative_eq!(north, east, epsilon = 1e-12);
    }

    #[test]
    fn test_heading_likelihood_peaks_at_prediction() {
        let prev = (2.0, 4.0);
        let at_prediction = heading_likelihood((2.0, 4.7), prev, 0.0, 0.7, 0.5);
        let off_prediction = heading_likelihood((2.7, 4.0), prev, 0.0, 0.7, 0.5);
        assert!(at_prediction > off_prediction);
    }

    #[test]
    fn test_continuity_decays_with_distance() {
        let prev = (2.0, 4.0);
        let near = continuity_likelihood((2.1, 4.0), prev, 1.5);
        let far = continuity_likelihood((6.0, 4.0), prev, 1.5);
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn test_motion_history_prior_is_uniform() {
        assert_eq!(motion_history_prior((0.0, 0.0)), 1.0);
        assert_eq!(motion_history_prior((100.0, -3.0)), 1.0);
    }
}

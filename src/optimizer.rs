//! Bounded local maximizer for the MAP update.
//!
//! Derivative-free Nelder-Mead simplex search over (x, y) with box
//! constraints: every candidate vertex is clamped into the bounds before
//! evaluation, so the search never leaves the floor plan's extent. The
//! iteration cap guarantees termination; a search that stops at the cap
//! still returns its best iterate.

use log::debug;
use nalgebra::Vector2;

/// Axis-aligned search box.
#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    pub min: (f64, f64),
    pub max: (f64, f64),
}

impl Bounds {
    pub fn clamp(&self, point: (f64, f64)) -> (f64, f64) {
        (
            point.0.clamp(self.min.0, self.max.0),
            point.1.clamp(self.min.1, self.max.1),
        )
    }
}

/// Configuration for the simplex search.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    /// Hard iteration cap.
    pub max_iterations: usize,

    /// Convergence threshold on the simplex's objective spread.
    pub tolerance: f64,

    /// Edge length of the initial simplex (meters).
    pub initial_step: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-9,
            initial_step: 0.25,
        }
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the iteration cap.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Builder-style setter for the convergence threshold.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

// Standard Nelder-Mead coefficients.
const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Maximize `objective` inside `bounds`, starting from `start`.
///
/// Deterministic: the same objective, start and bounds always produce the
/// same result. Non-convergence within the iteration cap is best-effort
/// degradation, not an error: the best vertex seen so far is returned and
/// the event is logged at debug level.
pub fn maximize<F>(objective: F, start: (f64, f64), bounds: Bounds, config: &OptimizerConfig) -> (f64, f64)
where
    F: Fn(f64, f64) -> f64,
{
    let evaluate = |v: Vector2<f64>| -> (Vector2<f64>, f64) {
        let (x, y) = bounds.clamp((v.x, v.y));
        (Vector2::new(x, y), objective(x, y))
    };

    let start = bounds.clamp(start);
    let step = config.initial_step;

    // Initial simplex around the start point. Clamping can collapse a
    // vertex onto the start at the box edge; step inward instead.
    let offset_vertex = |dx: f64, dy: f64| -> Vector2<f64> {
        let forward = bounds.clamp((start.0 + dx, start.1 + dy));
        if forward == start {
            let backward = bounds.clamp((start.0 - dx, start.1 - dy));
            Vector2::new(backward.0, backward.1)
        } else {
            Vector2::new(forward.0, forward.1)
        }
    };

    let mut simplex = vec![
        evaluate(Vector2::new(start.0, start.1)),
        evaluate(offset_vertex(step, 0.0)),
        evaluate(offset_vertex(0.0, step)),
    ];

    let order = |simplex: &mut Vec<(Vector2<f64>, f64)>| {
        simplex.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    };

    let mut converged = false;
    for _ in 0..config.max_iterations {
        order(&mut simplex);
        if (simplex[0].1 - simplex[2].1).abs() < config.tolerance {
            converged = true;
            break;
        }

        let centroid = (simplex[0].0 + simplex[1].0) / 2.0;
        let worst = simplex[2];

        let reflected = evaluate(centroid + REFLECTION * (centroid - worst.0));
        if reflected.1 > simplex[0].1 {
            let expanded = evaluate(centroid + EXPANSION * (reflected.0 - centroid));
            simplex[2] = if expanded.1 > reflected.1 { expanded } else { reflected };
            continue;
        }
        if reflected.1 > simplex[1].1 {
            simplex[2] = reflected;
            continue;
        }

        let contracted = evaluate(centroid + CONTRACTION * (worst.0 - centroid));
        if contracted.1 > worst.1 {
            simplex[2] = contracted;
            continue;
        }

        // Shrink toward the best vertex.
        for i in 1..3 {
            let v = simplex[0].0 + SHRINK * (simplex[i].0 - simplex[0].0);
            simplex[i] = evaluate(v);
        }
    }

    if !converged {
        debug!(
            "simplex search stopped at the {}-iteration cap, accepting best iterate",
            config.max_iterations
        );
    }

    order(&mut simplex);
    (simplex[0].0.x, simplex[0].0.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Bounds {
        Bounds {
            min: (0.0, 0.0),
            max: (10.0, 10.0),
        }
    }

    #[test]
    fn test_finds_interior_maximum() {
        let objective = |x: f64, y: f64| -((x - 3.0).powi(2) + (y - 4.0).powi(2));
        let result = maximize(objective, (1.0, 1.0), unit_box(), &OptimizerConfig::default());
        assert_relative_eq!(result.0, 3.0, epsilon = 1e-3);
        assert_relative_eq!(result.1, 4.0, epsilon = 1e-3);
    }

    #[test]
    fn test_respects_bounds() {
        // True maximizer sits outside the box; the search must stop at
        // the edge instead of following it out.
        let objective = |x: f64, y: f64| -((x - 12.0).powi(2) + (y - 5.0).powi(2));
        let result = maximize(objective, (8.0, 5.0), unit_box(), &OptimizerConfig::default());
        assert_relative_eq!(result.0, 10.0, epsilon = 1e-3);
        assert!(result.1 >= 0.0 && result.1 <= 10.0);
    }

    #[test]
    fn test_start_on_box_corner() {
        let objective = |x: f64, y: f64| -((x - 5.0).powi(2) + (y - 5.0).powi(2));
        let result = maximize(
            objective,
            (10.0, 10.0),
            unit_box(),
            &OptimizerConfig::default(),
        );
        assert_relative_eq!(result.0, 5.0, epsilon = 1e-3);
        assert_relative_eq!(result.1, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn test_deterministic() {
        let objective = |x: f64, y: f64| -(x.powi(2) + 0.5 * y.powi(2)) + x * 0.3;
        let first = maximize(objective, (7.0, 7.0), unit_box(), &OptimizerConfig::default());
        let second = maximize(objective, (7.0, 7.0), unit_box(), &OptimizerConfig::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_iteration_cap_still_returns_point() {
        let config = OptimizerConfig::new().with_max_iterations(3).with_tolerance(1e-6);
        let objective = |x: f64, y: f64| -((x - 3.0).powi(2) + (y - 4.0).powi(2));
        let result = maximize(objective, (9.0, 9.0), unit_box(), &config);
        // Not converged, but the iterate must be inside the box.
        assert!(result.0 >= 0.0 && result.0 <= 10.0);
        assert!(result.1 >= 0.0 && result.1 <= 10.0);
    }
}

//! Constrained maximum-a-posteriori position filter.
//!
//! Combines the floor-plan field with the stride-circle, heading and
//! continuity likelihoods into a single log-posterior and commits its
//! bounded maximizer as the new estimate. The floor-plan term carries a
//! large weight so that crossing a wall costs orders of magnitude more
//! than any gain the motion terms can offer: walls act as hard
//! constraints, not soft preferences.

use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::floor_plan::FloorPlanField;
use crate::motion_models::{
    continuity_likelihood, heading_likelihood, motion_history_prior, project_forward,
    stride_circle_likelihood,
};
use crate::optimizer::{maximize, Bounds, OptimizerConfig};
use crate::types::StrideEvent;

/// Floor applied to every posterior factor before taking its logarithm.
const LIKELIHOOD_FLOOR: f64 = 1e-10;

/// Committed positions kept for collaborators, oldest evicted first.
const HISTORY_CAPACITY: usize = 10;

/// Fixed placeholder covariance; not derived from the posterior curvature.
const PLACEHOLDER_VARIANCE: f64 = 0.3;

/// Tunables for the MAP filter. The defaults are empirically calibrated,
/// not derived; treat them as configuration.
#[derive(Clone, Debug)]
pub struct BayesianConfig {
    /// Stride-length noise sigma [meters].
    pub sigma_stride: f64,

    /// Heading/sensor likelihood sigma [meters]. Deliberately weak.
    pub sigma_heading: f64,

    /// Continuity likelihood sigma [meters]. Deliberately weak.
    pub sigma_continuity: f64,

    /// Weight on the floor-plan log-term. Large values make wall cells an
    /// energy barrier no motion term can outbid.
    pub floor_plan_weight: f64,

    /// Probabilities below this mark a wall when probing the stride path.
    pub wall_threshold: f64,

    /// Number of probe points along the stride path.
    pub path_samples: usize,

    /// Settings for the bounded maximization.
    pub optimizer: OptimizerConfig,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            sigma_stride: 0.1,
            sigma_heading: 0.5,
            sigma_continuity: std::f64::consts::SQRT_2,
            floor_plan_weight: 1000.0,
            wall_threshold: 0.1,
            path_samples: 10,
            optimizer: OptimizerConfig::default(),
        }
    }
}

/// Snapshot of the filter state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BayesianFilterState {
    pub position: (f64, f64),
    pub history: Vec<(f64, f64)>,
    pub updates: u64,
}

pub struct BayesianFilter {
    floor_plan: Arc<FloorPlanField>,
    config: BayesianConfig,
    estimate: (f64, f64),
    history: VecDeque<(f64, f64)>,
    updates: u64,
}

impl BayesianFilter {
    pub fn new(floor_plan: Arc<FloorPlanField>, config: BayesianConfig, initial: (f64, f64)) -> Self {
        Self {
            floor_plan,
            config,
            estimate: initial,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            updates: 0,
        }
    }

    /// Process one stride and commit the posterior maximizer.
    pub fn update(&mut self, stride: &StrideEvent) -> (f64, f64) {
        let prev = self.estimate;
        let projected = project_forward(prev, stride.heading_rad, stride.stride_m);

        // Seed the search away from the projection when the straight path
        // to it crosses a wall; a local search seeded inside the wall's
        // penalty plateau cannot escape it.
        let seed = if self.path_crosses_wall(prev, projected) {
            debug!(
                "stride path ({:.2}, {:.2}) -> ({:.2}, {:.2}) crosses a wall, seeding at previous estimate",
                prev.0, prev.1, projected.0, projected.1
            );
            prev
        } else {
            projected
        };

        let bounds = Bounds {
            min: (0.0, 0.0),
            max: (self.floor_plan.width_m(), self.floor_plan.height_m()),
        };
        let committed = bounds.clamp(maximize(
            |x, y| self.log_posterior((x, y), prev, stride),
            seed,
            bounds,
            &self.config.optimizer,
        ));

        self.estimate = committed;
        self.history.push_back(committed);
        if self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.updates += 1;

        committed
    }

    /// Weighted sum of log-likelihoods over the five posterior factors,
    /// each floored before the log so a zero never turns into -inf.
    fn log_posterior(&self, candidate: (f64, f64), prev: (f64, f64), stride: &StrideEvent) -> f64 {
        let p_floor = self.floor_plan.probability(candidate.0, candidate.1);
        let p_stride =
            stride_circle_likelihood(candidate, prev, stride.stride_m, self.config.sigma_stride);
        let p_heading = heading_likelihood(
            candidate,
            prev,
            stride.heading_rad,
            stride.stride_m,
            self.config.sigma_heading,
        );
        let p_continuity = continuity_likelihood(candidate, prev, self.config.sigma_continuity);
        let p_motion = motion_history_prior(candidate);

        self.config.floor_plan_weight * p_floor.max(LIKELIHOOD_FLOOR).ln()
            + p_stride.max(LIKELIHOOD_FLOOR).ln()
            + p_heading.max(LIKELIHOOD_FLOOR).ln()
            + p_continuity.max(LIKELIHOOD_FLOOR).ln()
            + p_motion.max(LIKELIHOOD_FLOOR).ln()
    }

    /// Probe evenly spaced points along the segment from `from` to `to`.
    /// Any probe under the wall threshold means the straight path is
    /// obstructed.
    fn path_crosses_wall(&self, from: (f64, f64), to: (f64, f64)) -> bool {
        let samples = self.config.path_samples.max(1);
        (1..=samples).any(|i| {
            let t = i as f64 / samples as f64;
            let x = from.0 + t * (to.0 - from.0);
            let y = from.1 + t * (to.1 - from.1);
            self.floor_plan.probability(x, y) < self.config.wall_threshold
        })
    }

    pub fn position(&self) -> (f64, f64) {
        self.estimate
    }

    /// Committed positions, oldest first, at most ten entries.
    pub fn history(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.history.iter()
    }

    /// Fixed placeholder covariance. Callers must not read posterior
    /// curvature into it.
    pub fn covariance(&self) -> [[f64; 2]; 2] {
        [[PLACEHOLDER_VARIANCE, 0.0], [0.0, PLACEHOLDER_VARIANCE]]
    }

    /// Move the filter to a new position, clearing the history. Tunables
    /// are untouched.
    pub fn reset(&mut self, position: (f64, f64)) {
        self.estimate = position;
        self.history.clear();
        self.updates = 0;
    }

    pub fn snapshot(&self) -> BayesianFilterState {
        BayesianFilterState {
            position: self.estimate,
            history: self.history.iter().copied().collect(),
            updates: self.updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn open_room() -> Arc<FloorPlanField> {
        Arc::new(FloorPlanField::rectangular_room(20.0, 10.0, 0.1, 0.3))
    }

    /// 10 x 10 m field, fully walkable except a 0.6 m wall band centered
    /// at x = 5.0.
    fn field_with_center_wall() -> Arc<FloorPlanField> {
        let (width, height, resolution) = (10.0, 10.0, 0.1);
        let grid_width = (width / resolution) as usize;
        let grid_height = (height / resolution) as usize;

        let mut cells = vec![1.0; grid_width * grid_height];
        for y in 0..grid_height {
            for x in 47..53 {
                cells[y * grid_width + x] = 0.01;
            }
        }
        Arc::new(FloorPlanField::from_cells(width, height, resolution, cells))
    }

    fn stride(heading: f64) -> StrideEvent {
        StrideEvent::new(heading, 0.7).unwrap()
    }

    #[test]
    fn test_unobstructed_step_lands_near_projection() {
        let mut filter = BayesianFilter::new(open_room(), BayesianConfig::default(), (2.0, 4.0));
        let (x, y) = filter.update(&stride(0.0));
        // The weak continuity term shrinks the step by a few millimeters;
        // anything beyond centimeter scale is a defect.
        assert!((x - 2.0).abs() < 0.02, "x = {x}");
        assert!((y - 4.7).abs() < 0.02, "y = {y}");
    }

    #[test]
    fn test_never_commits_into_wall_band() {
        let mut filter =
            BayesianFilter::new(field_with_center_wall(), BayesianConfig::default(), (2.0, 5.0));

        // Walk straight at the wall, far past the point dead reckoning
        // would cross it.
        for _ in 0..10 {
            let (x, _) = filter.update(&stride(FRAC_PI_2));
            assert!(x < 5.3, "committed x = {x} is past the wall band");
        }
        // It should have advanced to the wall rather than stalling at the
        // start.
        assert!(filter.position().0 > 3.5);
    }

    #[test]
    fn test_wall_guard_reseeds_from_previous_position() {
        let filter =
            BayesianFilter::new(field_with_center_wall(), BayesianConfig::default(), (4.4, 5.0));
        // Projection at (5.1, 5.0) sits inside the band.
        assert!(filter.path_crosses_wall((4.4, 5.0), (5.1, 5.0)));
        // A step parallel to the wall stays clear.
        assert!(!filter.path_crosses_wall((4.4, 5.0), (4.4, 5.7)));
    }

    #[test]
    fn test_history_is_capped_fifo() {
        let mut filter = BayesianFilter::new(open_room(), BayesianConfig::default(), (2.0, 2.0));
        let first = filter.update(&stride(0.8));
        for _ in 0..14 {
            filter.update(&stride(0.8));
        }

        let snapshot = filter.snapshot();
        assert_eq!(snapshot.history.len(), 10);
        assert_eq!(snapshot.updates, 15);
        // The first commit must have been evicted.
        assert!(snapshot.history.iter().all(|p| *p != first));
        // Newest entry is the current estimate.
        assert_eq!(*snapshot.history.last().unwrap(), filter.position());
    }

    #[test]
    fn test_reset_clears_history_and_estimate() {
        let mut filter = BayesianFilter::new(open_room(), BayesianConfig::default(), (2.0, 4.0));
        for _ in 0..3 {
            filter.update(&stride(0.5));
        }

        filter.reset((7.0, 3.0));
        assert_eq!(filter.position(), (7.0, 3.0));
        assert_eq!(filter.history().count(), 0);
        assert_eq!(filter.snapshot().updates, 0);
    }

    #[test]
    fn test_covariance_is_a_fixed_placeholder() {
        let mut filter = BayesianFilter::new(open_room(), BayesianConfig::default(), (2.0, 4.0));
        let before = filter.covariance();
        filter.update(&stride(0.0));
        assert_eq!(filter.covariance(), before);
        assert_eq!(before[0][0], before[1][1]);
        assert_eq!(before[0][1], 0.0);
    }

    #[test]
    fn test_estimate_stays_in_bounds_under_boundary_pressure() {
        // Hammer the outer wall; every commit must stay inside the field.
        let mut filter = BayesianFilter::new(open_room(), BayesianConfig::default(), (19.0, 5.0));
        for _ in 0..10 {
            let (x, y) = filter.update(&stride(FRAC_PI_2));
            assert!((0.0..=20.0).contains(&x));
            assert!((0.0..=10.0).contains(&y));
        }
    }

    #[test]
    fn test_log_posterior_is_finite_everywhere() {
        let filter = BayesianFilter::new(open_room(), BayesianConfig::default(), (2.0, 4.0));
        let event = stride(0.0);
        for &candidate in &[(-5.0, -5.0), (0.0, 0.0), (2.0, 4.7), (25.0, 15.0)] {
            let value = filter.log_posterior(candidate, (2.0, 4.0), &event);
            assert!(value.is_finite(), "log-posterior at {candidate:?} = {value}");
        }
    }
}

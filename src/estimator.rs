//! Uniform stride-in, estimate-out surface over the three filters.
//!
//! Everything here is independent of sensing hardware, stride detection
//! and any transport layer: validated stride events come in, position
//! estimates go out. Collaborators select a filter with [`EstimatorKind`]
//! and own the returned estimator exclusively; the crate holds no
//! process-wide state. One estimator must be driven from one thread at a
//! time, but separate estimators own disjoint state and may run in
//! parallel over the same shared floor plan.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;
use crate::filters::bayesian::{BayesianConfig, BayesianFilter, BayesianFilterState};
use crate::filters::kalman::{KalmanConfig, KalmanFilter, KalmanFilterState};
use crate::filters::particle::{ParticleConfig, ParticleFilter, ParticleFilterState};
use crate::floor_plan::FloorPlanField;
use crate::motion_models::project_forward;
use crate::types::{display_position, StrideEvent};

/// Which filter backs a [`PositionEstimator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimatorKind {
    #[default]
    Bayesian,
    Kalman,
    Particle,
}

/// Tunables for all three filters; only the selected filter's section
/// applies.
#[derive(Clone, Debug, Default)]
pub struct EstimatorConfig {
    pub kind: EstimatorKind,
    pub bayesian: BayesianConfig,
    pub kalman: KalmanConfig,
    pub particle: ParticleConfig,
}

/// Serializable snapshot of whichever filter backs the estimator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EstimatorState {
    Bayesian(BayesianFilterState),
    Kalman(KalmanFilterState),
    Particle(ParticleFilterState),
}

pub enum PositionEstimator {
    Bayesian(BayesianFilter),
    Kalman(KalmanFilter),
    Particle(ParticleFilter),
}

impl PositionEstimator {
    /// Construct the filter selected by `config.kind` at `initial`.
    ///
    /// The Bayesian and particle filters need the floor plan; the Kalman
    /// filter runs without one.
    pub fn new(
        config: EstimatorConfig,
        floor_plan: Option<Arc<FloorPlanField>>,
        initial: (f64, f64),
    ) -> Result<Self, EstimatorError> {
        match config.kind {
            EstimatorKind::Bayesian => {
                let floor_plan =
                    floor_plan.ok_or(EstimatorError::MissingFloorPlan(EstimatorKind::Bayesian))?;
                Ok(Self::Bayesian(BayesianFilter::new(
                    floor_plan,
                    config.bayesian,
                    initial,
                )))
            }
            EstimatorKind::Kalman => Ok(Self::Kalman(KalmanFilter::new(&config.kalman, initial))),
            EstimatorKind::Particle => {
                let floor_plan =
                    floor_plan.ok_or(EstimatorError::MissingFloorPlan(EstimatorKind::Particle))?;
                Ok(Self::Particle(ParticleFilter::new(
                    floor_plan,
                    config.particle,
                    initial,
                )))
            }
        }
    }

    /// Consume one stride event and return the new position estimate.
    ///
    /// Input is validated here, before any filter state changes; a
    /// rejected event leaves the estimator untouched.
    pub fn update(&mut self, heading_rad: f64, stride_m: f64) -> Result<(f64, f64), EstimatorError> {
        let stride = StrideEvent::new(heading_rad, stride_m)?;

        let estimate = match self {
            Self::Bayesian(filter) => filter.update(&stride),
            Self::Kalman(filter) => {
                // The linear filter has no notion of heading or floor
                // plan; it is fed its own forward-projected position as
                // the measurement.
                let measurement =
                    project_forward(filter.position(), stride.heading_rad, stride.stride_m);
                filter.predict();
                filter.update(measurement);
                filter.position()
            }
            Self::Particle(filter) => filter.update_stride(&stride),
        };

        Ok(estimate)
    }

    /// Move the estimator to a new position, clearing history, covariance
    /// or particle cloud back to the construction shape.
    pub fn reset(&mut self, position: (f64, f64)) {
        match self {
            Self::Bayesian(filter) => filter.reset(position),
            Self::Kalman(filter) => filter.reset(position),
            Self::Particle(filter) => filter.reset(position),
        }
    }

    /// Current position estimate [meters].
    pub fn position(&self) -> (f64, f64) {
        match self {
            Self::Bayesian(filter) => filter.position(),
            Self::Kalman(filter) => filter.position(),
            Self::Particle(filter) => filter.position(),
        }
    }

    /// Current estimate rounded to 3 decimal places for presentation
    /// surfaces.
    pub fn display_position(&self) -> (f64, f64) {
        display_position(self.position())
    }

    pub fn kind(&self) -> EstimatorKind {
        match self {
            Self::Bayesian(_) => EstimatorKind::Bayesian,
            Self::Kalman(_) => EstimatorKind::Kalman,
            Self::Particle(_) => EstimatorKind::Particle,
        }
    }

    /// Serializable snapshot of the backing filter.
    pub fn state(&self) -> EstimatorState {
        match self {
            Self::Bayesian(filter) => EstimatorState::Bayesian(filter.snapshot()),
            Self::Kalman(filter) => EstimatorState::Kalman(filter.snapshot()),
            Self::Particle(filter) => EstimatorState::Particle(filter.snapshot()),
        }
    }
}

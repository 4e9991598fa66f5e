//! Indoor position estimation from stride events.
//!
//! Tracks a walking person's 2-D position inside a building from noisy
//! per-step observations (heading + stride length), using the building's
//! floor plan as a correcting prior. Three interchangeable filters back
//! the same surface:
//!
//!   - a constrained maximum-a-posteriori filter that treats walls as
//!     hard constraints ([`filters::BayesianFilter`]),
//!   - a linear Kalman filter with no floor-plan awareness, the smooth
//!     but naive baseline ([`filters::KalmanFilter`]),
//!   - a particle filter reweighted by the floor plan
//!     ([`filters::ParticleFilter`]).
//!
//! Everything in this crate is pure computation, independent of sensing
//! hardware, stride detection, and any transport layer. The surrounding
//! system delivers ready heading values and detected strides, and drives
//! the crate through [`PositionEstimator`]:
//!
//! ```
//! use std::sync::Arc;
//! use stride_tracker_rs::{EstimatorConfig, FloorPlanField, PositionEstimator};
//!
//! let floor_plan = Arc::new(FloorPlanField::rectangular_room(20.0, 10.0, 0.1, 0.3));
//! let mut estimator =
//!     PositionEstimator::new(EstimatorConfig::default(), Some(floor_plan), (2.0, 4.0))?;
//!
//! let position = estimator.update(0.0, 0.7)?;
//! assert!(position.1 > 4.0);
//! # Ok::<(), stride_tracker_rs::EstimatorError>(())
//! ```

pub mod error;
pub mod estimator;
pub mod filters;
pub mod floor_plan;
pub mod motion_models;
pub mod optimizer;
pub mod types;

pub use error::EstimatorError;
pub use estimator::{EstimatorConfig, EstimatorKind, EstimatorState, PositionEstimator};
pub use floor_plan::{FloorPlanDescriptor, FloorPlanField};
pub use types::StrideEvent;

use thiserror::Error;

use crate::estimator::EstimatorKind;

/// Errors surfaced at the estimator boundary.
///
/// Only invalid caller input reaches this type. Numerical degeneracies
/// (zero likelihoods, collapsed particle weights, a singular innovation
/// covariance, a non-convergent optimization) are recovered internally
/// and reported through the `log` facade instead.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum EstimatorError {
    #[error("stride length must be positive and finite, got {0}")]
    InvalidStrideLength(f64),

    #[error("heading must be finite, got {0}")]
    InvalidHeading(f64),

    #[error("{0:?} estimator requires a floor plan")]
    MissingFloorPlan(EstimatorKind),
}

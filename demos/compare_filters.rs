//! Walk the same scripted stride sequence through all three filters and
//! print the trajectories side by side.
//!
//! Run with: cargo run --example compare_filters

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use stride_tracker_rs::{EstimatorConfig, EstimatorKind, FloorPlanField, PositionEstimator};

fn main() -> Result<(), stride_tracker_rs::EstimatorError> {
    env_logger::init();

    let floor_plan = Arc::new(FloorPlanField::rectangular_room(20.0, 10.0, 0.1, 0.3));
    let start = (2.0, 4.0);

    let mut estimators: Vec<(&str, PositionEstimator)> = [
        ("bayesian", EstimatorKind::Bayesian),
        ("kalman", EstimatorKind::Kalman),
        ("particle", EstimatorKind::Particle),
    ]
    .into_iter()
    .map(|(name, kind)| {
        let config = EstimatorConfig {
            kind,
            ..EstimatorConfig::default()
        };
        PositionEstimator::new(config, Some(floor_plan.clone()), start).map(|e| (name, e))
    })
    .collect::<Result<_, _>>()?;

    // L-shaped walk: five strides along +y, a turn, five strides along +x.
    let script: Vec<(f64, f64)> = std::iter::repeat((0.0, 0.7))
        .take(5)
        .chain(std::iter::repeat((FRAC_PI_2, 0.7)).take(5))
        .collect();

    println!("step  heading  {:>18}  {:>18}  {:>18}", "bayesian", "kalman", "particle");
    for (step, (heading, stride)) in script.iter().enumerate() {
        let mut row = format!("{:>4}  {:>7.3}", step + 1, heading);
        for (_, estimator) in estimators.iter_mut() {
            let (x, y) = estimator.update(*heading, *stride)?;
            row.push_str(&format!("  ({x:>7.3}, {y:>7.3})"));
        }
        println!("{row}");
    }

    println!();
    for (name, estimator) in &estimators {
        let (x, y) = estimator.display_position();
        println!("{name:>9} final: ({x}, {y})");
    }
    println!("dead reckoning would end at (5.5, 7.5)");

    Ok(())
}

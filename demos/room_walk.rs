//! Walk the MAP filter straight into a wall and watch it refuse to cross.
//!
//! Run with: cargo run --example room_walk

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use stride_tracker_rs::{EstimatorConfig, FloorPlanField, PositionEstimator};

fn main() -> Result<(), stride_tracker_rs::EstimatorError> {
    env_logger::init();

    let floor_plan = Arc::new(FloorPlanField::rectangular_room(10.0, 10.0, 0.1, 0.3));
    let descriptor = floor_plan.descriptor();
    println!(
        "room: {} x {} m at {} m/cell ({} x {} cells)",
        descriptor.width_m,
        descriptor.height_m,
        descriptor.resolution_m,
        floor_plan.grid_width(),
        floor_plan.grid_height(),
    );

    let mut estimator =
        PositionEstimator::new(EstimatorConfig::default(), Some(floor_plan), (2.0, 5.0))?;

    // Heading straight at the right wall; dead reckoning would exit the
    // room after the twelfth stride.
    for step in 1..=15 {
        let (x, y) = estimator.update(FRAC_PI_2, 0.7)?;
        println!("step {step:>2}: ({x:.3}, {y:.3})");
    }

    let (x, y) = estimator.display_position();
    println!("settled at ({x}, {y}) against the wall");

    Ok(())
}

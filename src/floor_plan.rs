//! Static floor-plan likelihood field.
//!
//! A rasterized probability-like map over the 2-D plane: walkable cells
//! carry 1.0, wall cells 0.01. Boundaries are a hard step with no smoothing,
//! so a single threshold cleanly separates "inside" from "wall".
//!
//! The field is immutable after construction and safe to share across
//! threads; estimators hold it behind an `Arc` and query it concurrently.

use serde::{Deserialize, Serialize};

/// Likelihood stored in wall cells and returned outside the grid.
pub const WALL_PROBABILITY: f64 = 0.01;

/// Likelihood stored in walkable interior cells.
pub const WALKABLE_PROBABILITY: f64 = 1.0;

/// Rasterized likelihood map over `[0, width_m] x [0, height_m]`.
///
/// Cell (i, j) covers the rectangle
/// `[i*res, (i+1)*res) x [j*res, (j+1)*res)` with the origin at the
/// bottom-left corner of the rasterized area.
#[derive(Clone, Debug)]
pub struct FloorPlanField {
    width_m: f64,
    height_m: f64,
    resolution_m: f64,
    grid_width: usize,
    grid_height: usize,
    /// Row-major cell likelihoods, indexed `[y * grid_width + x]`.
    cells: Vec<f64>,
}

/// Export shape for external rendering: dimensions plus the full grid as
/// rows of floats.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FloorPlanDescriptor {
    pub width_m: f64,
    pub height_m: f64,
    pub resolution_m: f64,
    pub grid: Vec<Vec<f64>>,
}

impl FloorPlanField {
    /// Build a single rectangular room with four walls.
    ///
    /// `width_m` and `height_m` are OUTER dimensions including the walls;
    /// the walkable interior is inset by `wall_thickness_m` from every
    /// edge. Everything outside the interior rectangle stays at
    /// [`WALL_PROBABILITY`].
    pub fn rectangular_room(
        width_m: f64,
        height_m: f64,
        resolution_m: f64,
        wall_thickness_m: f64,
    ) -> Self {
        assert!(width_m > 0.0 && height_m > 0.0, "room dimensions must be positive");
        assert!(resolution_m > 0.0, "resolution must be positive");

        // Rounding (not truncation) keeps near-integer ratios like
        // 19.7 / 0.1 from losing their last cell to float error.
        let grid_width = (width_m / resolution_m).round() as usize;
        let grid_height = (height_m / resolution_m).round() as usize;
        assert!(
            grid_width > 0 && grid_height > 0,
            "room must span at least one cell"
        );
        let mut cells = vec![WALL_PROBABILITY; grid_width * grid_height];

        // Interior rectangle, clamped so degenerate rooms still leave at
        // least one walkable cell.
        let x_start = ((wall_thickness_m / resolution_m).round() as usize).min(grid_width - 1);
        let x_end = ((((width_m - wall_thickness_m) / resolution_m).round() as usize)
            .min(grid_width))
        .max(x_start + 1);
        let y_start = ((wall_thickness_m / resolution_m).round() as usize).min(grid_height - 1);
        let y_end = ((((height_m - wall_thickness_m) / resolution_m).round() as usize)
            .min(grid_height))
        .max(y_start + 1);

        for y in y_start..y_end {
            for x in x_start..x_end {
                cells[y * grid_width + x] = WALKABLE_PROBABILITY;
            }
        }

        FloorPlanField {
            width_m,
            height_m,
            resolution_m,
            grid_width,
            grid_height,
            cells,
        }
    }

    /// Build a field from raw cell likelihoods (row-major, bottom row
    /// first). Lets callers substitute any likelihood map with the same
    /// shape as the built-in room generator.
    pub fn from_cells(width_m: f64, height_m: f64, resolution_m: f64, cells: Vec<f64>) -> Self {
        let grid_width = (width_m / resolution_m).round() as usize;
        let grid_height = (height_m / resolution_m).round() as usize;
        assert_eq!(
            cells.len(),
            grid_width * grid_height,
            "cell count must match grid dimensions"
        );

        FloorPlanField {
            width_m,
            height_m,
            resolution_m,
            grid_width,
            grid_height,
            cells,
        }
    }

    /// Likelihood at world position (x, y) in meters.
    ///
    /// Returns the stored cell value for in-bounds positions and
    /// [`WALL_PROBABILITY`] outside the rasterized area.
    pub fn probability(&self, x: f64, y: f64) -> f64 {
        let grid_x = (x / self.resolution_m).floor();
        let grid_y = (y / self.resolution_m).floor();

        if grid_x < 0.0
            || grid_y < 0.0
            || grid_x >= self.grid_width as f64
            || grid_y >= self.grid_height as f64
        {
            return WALL_PROBABILITY;
        }

        self.cells[grid_y as usize * self.grid_width + grid_x as usize]
    }

    pub fn width_m(&self) -> f64 {
        self.width_m
    }

    pub fn height_m(&self) -> f64 {
        self.height_m
    }

    pub fn resolution_m(&self) -> f64 {
        self.resolution_m
    }

    pub fn grid_width(&self) -> usize {
        self.grid_width
    }

    pub fn grid_height(&self) -> usize {
        self.grid_height
    }

    /// Export the field for external rendering.
    pub fn descriptor(&self) -> FloorPlanDescriptor {
        let grid = self
            .cells
            .chunks(self.grid_width)
            .map(|row| row.to_vec())
            .collect();

        FloorPlanDescriptor {
            width_m: self.width_m,
            height_m: self.height_m,
            resolution_m: self.resolution_m,
            grid,
        }
    }
}

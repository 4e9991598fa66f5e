//! Linear Kalman filter over [x, y, vx, vy].
//!
//! Constant-velocity process model with a fixed time step. The filter has
//! no floor-plan awareness: it smooths whatever measurements it is fed and
//! will track a path straight through a wall. That makes it the smooth but
//! naive baseline next to the constrained filters.

use ndarray::{arr1, Array1, Array2};
use serde::{Deserialize, Serialize};

/// Tunables for the linear filter.
#[derive(Clone, Debug)]
pub struct KalmanConfig {
    /// Time step between strides [seconds].
    pub dt: f64,

    /// Process noise magnitude.
    pub process_noise: f64,

    /// Measurement noise standard deviation [meters].
    pub measurement_noise: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            process_noise: 0.1,
            measurement_noise: 0.5,
        }
    }
}

/// Snapshot of the filter state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KalmanFilterState {
    pub position: (f64, f64),
    pub velocity: (f64, f64),
    pub covariance_trace: f64,
    pub updates: u64,
}

pub struct KalmanFilter {
    /// State vector [x, y, vx, vy].
    state: Array1<f64>,

    /// State covariance [4x4].
    covariance: Array2<f64>,

    /// Process noise [4x4], built once from dt and the noise magnitude.
    process_noise: Array2<f64>,

    /// Measurement noise [2x2].
    measurement_noise: Array2<f64>,

    /// Constant-velocity state transition [4x4].
    transition: Array2<f64>,

    /// Position-only observation matrix [2x4].
    observation: Array2<f64>,

    updates: u64,
}

impl KalmanFilter {
    pub fn new(config: &KalmanConfig, initial: (f64, f64)) -> Self {
        Self {
            state: arr1(&[initial.0, initial.1, 0.0, 0.0]),
            covariance: Array2::<f64>::eye(4),
            process_noise: Self::build_process_noise(config.dt, config.process_noise),
            measurement_noise: Array2::<f64>::eye(2)
                * (config.measurement_noise * config.measurement_noise),
            transition: Self::build_transition(config.dt),
            observation: Self::build_observation(),
            updates: 0,
        }
    }

    fn build_transition(dt: f64) -> Array2<f64> {
        let mut f = Array2::<f64>::eye(4);
        f[[0, 2]] = dt;
        f[[1, 3]] = dt;
        f
    }

    fn build_observation() -> Array2<f64> {
        let mut h = Array2::<f64>::zeros((2, 4));
        h[[0, 0]] = 1.0;
        h[[1, 1]] = 1.0;
        h
    }

    fn build_process_noise(dt: f64, q: f64) -> Array2<f64> {
        let q_pos = q * dt.powi(4) / 4.0;
        let q_cross = q * dt.powi(3) / 2.0;
        let q_vel = q * dt.powi(2);

        let mut m = Array2::<f64>::zeros((4, 4));
        m[[0, 0]] = q_pos;
        m[[1, 1]] = q_pos;
        m[[0, 2]] = q_cross;
        m[[1, 3]] = q_cross;
        m[[2, 0]] = q_cross;
        m[[3, 1]] = q_cross;
        m[[2, 2]] = q_vel;
        m[[3, 3]] = q_vel;
        m
    }

    /// Prediction step: propagate state and covariance through the
    /// constant-velocity model.
    pub fn predict(&mut self) {
        self.state = self.transition.dot(&self.state);
        self.covariance =
            self.transition.dot(&self.covariance).dot(&self.transition.t()) + &self.process_noise;
    }

    /// Update step: fuse a position measurement (x, y).
    ///
    /// A singular innovation covariance skips the correction; the filter
    /// keeps its prediction rather than applying a garbage gain.
    pub fn update(&mut self, measurement: (f64, f64)) {
        let z = arr1(&[measurement.0, measurement.1]);
        let residual = &z - &self.observation.dot(&self.state);

        let ph_t = self.covariance.dot(&self.observation.t());
        let s = self.observation.dot(&ph_t) + &self.measurement_noise;

        let Some(s_inv) = invert_2x2(&s) else {
            return;
        };
        let gain = ph_t.dot(&s_inv);

        let correction = gain.dot(&residual);
        self.state = &self.state + &correction;

        let identity = Array2::<f64>::eye(4);
        self.covariance = (identity - gain.dot(&self.observation)).dot(&self.covariance);

        self.updates += 1;
    }

    pub fn position(&self) -> (f64, f64) {
        (self.state[0], self.state[1])
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.state[2], self.state[3])
    }

    /// Move the filter to a new position: velocity zeroed, covariance back
    /// to the construction value.
    pub fn reset(&mut self, position: (f64, f64)) {
        self.state = arr1(&[position.0, position.1, 0.0, 0.0]);
        self.covariance = Array2::<f64>::eye(4);
        self.updates = 0;
    }

    pub fn snapshot(&self) -> KalmanFilterState {
        KalmanFilterState {
            position: self.position(),
            velocity: self.velocity(),
            covariance_trace: (0..4).map(|i| self.covariance[[i, i]]).sum(),
            updates: self.updates,
        }
    }
}

fn invert_2x2(m: &Array2<f64>) -> Option<Array2<f64>> {
    let det = m[[0, 0]] * m[[1, 1]] - m[[0, 1]] * m[[1, 0]];
    if det.abs() < 1e-12 {
        return None;
    }

    let mut inv = Array2::<f64>::zeros((2, 2));
    inv[[0, 0]] = m[[1, 1]] / det;
    inv[[0, 1]] = -m[[0, 1]] / det;
    inv[[1, 0]] = -m[[1, 0]] / det;
    inv[[1, 1]] = m[[0, 0]] / det;
    Some(inv)
}

//! Particle filter with floor-plan reweighting.
//!
//! N position hypotheses with weights. Each stride perturbs every particle
//! in both direction and distance, the floor plan reweights the cloud, and
//! systematic resampling kicks in only when the effective sample size
//! collapses below N/2.

use std::sync::Arc;

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::floor_plan::FloorPlanField;
use crate::motion_models::project_forward;
use crate::types::StrideEvent;

/// Tunables for the particle filter.
#[derive(Clone, Debug)]
pub struct ParticleConfig {
    /// Number of particles.
    pub n_particles: usize,

    /// Per-axis positional process noise [meters].
    pub position_noise: f64,

    /// Per-particle heading perturbation [radians].
    pub heading_noise: f64,

    /// Seed for the filter's own RNG; a fixed seed reproduces whole
    /// trajectories.
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            n_particles: 100,
            position_noise: 0.3,
            heading_noise: 0.1,
            seed: 42,
        }
    }
}

/// Snapshot of the filter state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticleFilterState {
    pub position: (f64, f64),
    pub n_particles: usize,
    pub effective_sample_size: f64,
    pub resamples: u64,
}

pub struct ParticleFilter {
    floor_plan: Arc<FloorPlanField>,
    config: ParticleConfig,
    particles: Vec<(f64, f64)>,
    /// Parallel to `particles`; non-negative, sums to one.
    weights: Vec<f64>,
    estimate: (f64, f64),
    rng: StdRng,
    resamples: u64,
}

impl ParticleFilter {
    /// All particles start exactly at `initial` with uniform weights; the
    /// process noise of the first update diversifies the cloud.
    pub fn new(floor_plan: Arc<FloorPlanField>, config: ParticleConfig, initial: (f64, f64)) -> Self {
        assert!(config.n_particles >= 1, "need at least one particle");
        assert!(
            config.position_noise >= 0.0 && config.heading_noise >= 0.0,
            "noise parameters must be non-negative"
        );

        let n = config.n_particles;
        let seed = config.seed;
        Self {
            floor_plan,
            config,
            particles: vec![initial; n],
            weights: vec![1.0 / n as f64; n],
            estimate: initial,
            rng: StdRng::seed_from_u64(seed),
            resamples: 0,
        }
    }

    /// Process one stride: predict, reweight, conditionally resample.
    /// Returns the new weighted-mean estimate.
    pub fn update_stride(&mut self, stride: &StrideEvent) -> (f64, f64) {
        self.predict(stride);
        self.reweight();
        self.maybe_resample();

        self.estimate = self.weighted_mean();
        self.estimate
    }

    /// Move every particle by one noisy stride: heading perturbed per
    /// particle, then independent positional noise on each axis, so the
    /// cloud models uncertainty in both direction and distance.
    fn predict(&mut self, stride: &StrideEvent) {
        let Self {
            particles,
            rng,
            config,
            ..
        } = self;

        for particle in particles.iter_mut() {
            let noise: f64 = rng.sample(StandardNormal);
            let noisy_heading = stride.heading_rad + noise * config.heading_noise;

            let (mut x, mut y) = project_forward(*particle, noisy_heading, stride.stride_m);
            let jitter_x: f64 = rng.sample(StandardNormal);
            let jitter_y: f64 = rng.sample(StandardNormal);
            x += jitter_x * config.position_noise;
            y += jitter_y * config.position_noise;

            *particle = (x, y);
        }
    }

    /// Scale each weight by the floor-plan likelihood at the particle and
    /// renormalize. A cloud that left the walkable area entirely resets to
    /// uniform weights instead of dividing by zero.
    fn reweight(&mut self) {
        for (weight, particle) in self.weights.iter_mut().zip(&self.particles) {
            *weight *= self.floor_plan.probability(particle.0, particle.1);
        }

        let total: f64 = self.weights.iter().sum();
        if total > 0.0 {
            for weight in &mut self.weights {
                *weight /= total;
            }
        } else {
            warn!("particle weights collapsed to zero, resetting to uniform");
            let uniform = 1.0 / self.weights.len() as f64;
            for weight in &mut self.weights {
                *weight = uniform;
            }
        }
    }

    /// Systematic resampling, gated on the effective sample size dropping
    /// below N/2. Unconditional resampling would throw away diversity on
    /// every stride.
    fn maybe_resample(&mut self) {
        let n = self.particles.len();
        if self.effective_sample_size() >= n as f64 / 2.0 {
            return;
        }

        let jitter: f64 = self.rng.gen();
        let mut cumulative = Vec::with_capacity(n);
        let mut running = 0.0;
        for weight in &self.weights {
            running += weight;
            cumulative.push(running);
        }

        let mut resampled = Vec::with_capacity(n);
        let mut source = 0usize;
        for i in 0..n {
            let target = (i as f64 + jitter) / n as f64;
            while source < n - 1 && cumulative[source] < target {
                source += 1;
            }
            resampled.push(self.particles[source]);
        }

        self.particles = resampled;
        let uniform = 1.0 / n as f64;
        for weight in &mut self.weights {
            *weight = uniform;
        }
        self.resamples += 1;
    }

    /// `1 / sum(w^2)`: degeneracy measure over the current weights.
    pub fn effective_sample_size(&self) -> f64 {
        let sum_sq: f64 = self.weights.iter().map(|w| w * w).sum();
        if sum_sq > 0.0 {
            1.0 / sum_sq
        } else {
            0.0
        }
    }

    fn weighted_mean(&self) -> (f64, f64) {
        let mut x = 0.0;
        let mut y = 0.0;
        for (weight, particle) in self.weights.iter().zip(&self.particles) {
            x += weight * particle.0;
            y += weight * particle.1;
        }
        (x, y)
    }

    /// Current weighted-mean position estimate.
    pub fn position(&self) -> (f64, f64) {
        self.estimate
    }

    /// Particle positions and their weights, parallel slices.
    pub fn particles(&self) -> (&[(f64, f64)], &[f64]) {
        (&self.particles, &self.weights)
    }

    /// Collapse the cloud back onto `position`, exactly as constructed:
    /// uniform weights, reseeded RNG.
    pub fn reset(&mut self, position: (f64, f64)) {
        let n = self.particles.len();
        self.particles = vec![position; n];
        self.weights = vec![1.0 / n as f64; n];
        self.estimate = position;
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.resamples = 0;
    }

    pub fn snapshot(&self) -> ParticleFilterState {
        ParticleFilterState {
            position: self.estimate,
            n_particles: self.particles.len(),
            effective_sample_size: self.effective_sample_size(),
            resamples: self.resamples,
        }
    }
}

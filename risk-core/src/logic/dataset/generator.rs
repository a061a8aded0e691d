//! Synthetic Training Data Generator
//!
//! Draws NEO-like attributes from log-normal distributions and labels them
//! with the banded heuristic in `scoring.rs`.
//!
//! Draw order is fixed (all diameters, all velocities, all distances, all
//! magnitude noise, then one label-noise draw per sample) so a seed always
//! reproduces the same dataset.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, LogNormal, Normal};

use crate::logic::features::vector::{magnitude_from_diameter, FeatureVector};
use super::record::TrainingSample;
use super::scoring::{base_risk_score, label_from_score, LABEL_NOISE_STD};
use super::{Dataset, DatasetError};

/// Distribution parameters (μ, σ of the underlying normal)
pub const DIAMETER_LOGNORMAL: (f64, f64) = (1.5, 1.2);
pub const VELOCITY_LOGNORMAL: (f64, f64) = (2.8, 0.6);
pub const MISS_DISTANCE_LOGNORMAL: (f64, f64) = (6.5, 1.1);

/// Std of the Gaussian noise added to the diameter-derived magnitude
pub const MAGNITUDE_NOISE_STD: f64 = 1.0;

/// Seeded generator
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    pub sample_count: usize,
    pub seed: u64,
}

impl SyntheticGenerator {
    pub fn new(sample_count: usize, seed: u64) -> Self {
        Self { sample_count, seed }
    }

    /// Generate the labeled samples
    pub fn samples(&self) -> Result<Vec<TrainingSample>, DatasetError> {
        if self.sample_count == 0 {
            return Err(DatasetError::Empty);
        }

        let n = self.sample_count;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let diameters = draw(&lognormal(DIAMETER_LOGNORMAL)?, n, &mut rng);
        let velocities = draw(&lognormal(VELOCITY_LOGNORMAL)?, n, &mut rng);
        let distances = draw(&lognormal(MISS_DISTANCE_LOGNORMAL)?, n, &mut rng);
        let magnitude_noise = draw(&normal(MAGNITUDE_NOISE_STD)?, n, &mut rng);

        let label_noise = normal(LABEL_NOISE_STD)?;

        let samples = (0..n)
            .map(|i| {
                let magnitude = magnitude_from_diameter(diameters[i]) + magnitude_noise[i];
                let vector = FeatureVector::from_primary(diameters[i], velocities[i], distances[i], magnitude);

                let risk_score = base_risk_score(&vector.values) + label_noise.sample(&mut rng);
                TrainingSample::new(vector, risk_score, label_from_score(risk_score))
            })
            .collect();

        Ok(samples)
    }

    /// Generate and pack into a training matrix
    pub fn generate(&self) -> Result<Dataset, DatasetError> {
        let samples = self.samples()?;
        let dataset = Dataset::from_samples(&samples)?;

        log::info!(
            "Generated {} synthetic samples (seed {}), label distribution {:?}",
            dataset.len(),
            self.seed,
            dataset.label_distribution()
        );

        Ok(dataset)
    }
}

fn lognormal((mu, sigma): (f64, f64)) -> Result<LogNormal<f64>, DatasetError> {
    LogNormal::new(mu, sigma).map_err(|e| DatasetError::Distribution(e.to_string()))
}

fn normal(std_dev: f64) -> Result<Normal<f64>, DatasetError> {
    Normal::new(0.0, std_dev).map_err(|e| DatasetError::Distribution(e.to_string()))
}

fn draw<D: Distribution<f64>>(dist: &D, n: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..n).map(|_| dist.sample(rng)).collect()
}

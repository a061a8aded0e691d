//! Pipeline configuration
//!
//! Everything the risk pipeline consumes at runtime: threshold, training
//! size, seed, model location and the hyper-parameters of both models.

use std::path::{Path, PathBuf};

use crate::constants;
use super::model::forest::ForestParams;
use super::model::kmeans::KMeansParams;

/// Risk pipeline configuration
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Predictions below this confidence are reported as `Uncertain`
    pub confidence_threshold: f64,

    /// Synthetic samples generated when the models must be (re)trained
    pub sample_count: usize,

    /// Seed shared by the generator, the split, the forest and k-means
    pub seed: u64,

    /// Directory holding `scaler.json`, `risk_model.json`, `cluster_model.json`
    pub model_dir: PathBuf,

    /// Random forest hyper-parameters
    pub forest: ForestParams,

    /// K-means hyper-parameters
    pub clustering: KMeansParams,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: constants::DEFAULT_CONFIDENCE_THRESHOLD,
            sample_count: constants::DEFAULT_SAMPLE_COUNT,
            seed: constants::DEFAULT_SEED,
            model_dir: PathBuf::from(constants::DEFAULT_MODEL_DIR),
            forest: ForestParams::default(),
            clustering: KMeansParams::default(),
        }
    }
}

impl RiskConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            confidence_threshold: constants::get_confidence_threshold(),
            sample_count: constants::get_sample_count(),
            seed: constants::get_seed(),
            model_dir: PathBuf::from(constants::get_model_dir()),
            ..Default::default()
        }
    }

    /// Same configuration rooted at another model directory
    pub fn with_model_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.model_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.model_dir.join(constants::SCALER_FILE)
    }

    pub fn risk_model_path(&self) -> PathBuf {
        self.model_dir.join(constants::RISK_MODEL_FILE)
    }

    pub fn cluster_model_path(&self) -> PathBuf {
        self.model_dir.join(constants::CLUSTER_MODEL_FILE)
    }
}

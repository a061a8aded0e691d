//! Inference Engine
//!
//! `ModelBundle` is the fitted scaler + forest + k-means triple. It is
//! trained or loaded once and then shared read-only behind an `Arc`.
//! `RiskEngine` pairs it with the confidence threshold and turns records
//! into [`RiskResult`]s.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::constants::{CLUSTER_MODEL_FILE, RISK_MODEL_FILE, SCALER_FILE, TEST_SPLIT_RATIO};
use crate::logic::config::RiskConfig;
use crate::logic::dataset::SyntheticGenerator;
use crate::logic::features::{FeatureError, FeatureVector, ObjectRecord, FEATURE_COUNT, FEATURE_LAYOUT};
use super::forest::RandomForest;
use super::kmeans::KMeans;
use super::scaler::StandardScaler;
use super::storage::{load_artifact, save_artifact, ModelError};
use super::threshold::ThresholdConfig;
use super::types::RiskResult;

const SCALER_KIND: &str = "scaler";
const RISK_MODEL_KIND: &str = "risk_model";
pub(super) const CLUSTER_MODEL_KIND: &str = "cluster_model";

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("feature extraction failed: {0}")]
    Feature(#[from] FeatureError),

    #[error("{stage} produced a non-finite value: {values:?}")]
    NonFinite {
        stage: &'static str,
        values: Vec<f64>,
    },

    #[error("classifier returned class {0} outside the trained bands")]
    ClassOutOfRange(usize),
}

impl InferenceError {
    /// Pipeline stage the error was raised in
    pub fn stage(&self) -> &'static str {
        match self {
            InferenceError::Feature(_) => "features",
            InferenceError::NonFinite { stage, .. } => stage,
            InferenceError::ClassOutOfRange(_) => "classifier",
        }
    }
}

// ============================================================================
// MODEL BUNDLE
// ============================================================================

/// Fitted models
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    pub scaler: StandardScaler,
    pub forest: RandomForest,
    pub clusters: KMeans,
}

/// Training summary
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub feature_importances: [f64; FEATURE_COUNT],
}

impl ModelBundle {
    /// Fit all three models on freshly generated synthetic data
    pub fn train(config: &RiskConfig) -> Result<(Self, TrainingReport), ModelError> {
        log::info!(
            "Training risk models on {} synthetic samples (seed {})",
            config.sample_count,
            config.seed
        );

        let dataset = SyntheticGenerator::new(config.sample_count, config.seed).generate()?;
        let (train, test) = dataset.split(TEST_SPLIT_RATIO, config.seed)?;

        let scaler = StandardScaler::fit(&train.features)?;
        let train_x = scaler.transform_matrix(&train.features);
        let test_x = scaler.transform_matrix(&test.features);

        let forest = RandomForest::fit(&train_x, &train.labels, &config.forest, config.seed)?;
        let clusters = KMeans::fit(&train_x, &config.clustering, config.seed)?;

        let report = TrainingReport {
            train_size: train.len(),
            test_size: test.len(),
            train_accuracy: forest.accuracy(&train_x, &train.labels),
            test_accuracy: forest.accuracy(&test_x, &test.labels),
            feature_importances: forest.feature_importances,
        };

        log::info!(
            "Risk model trained: train accuracy {:.3}, test accuracy {:.3}",
            report.train_accuracy,
            report.test_accuracy
        );
        for (name, importance) in FEATURE_LAYOUT.iter().zip(report.feature_importances.iter()) {
            log::info!("  feature importance {}: {:.3}", name, importance);
        }
        log::info!("Cluster model trained: inertia {:.3}", clusters.inertia);

        Ok((Self { scaler, forest, clusters }, report))
    }

    /// Persist all three artifacts under the configured directory
    pub fn save(&self, config: &RiskConfig) -> Result<(), ModelError> {
        save_artifact(&config.scaler_path(), SCALER_KIND, &self.scaler)?;
        save_artifact(&config.risk_model_path(), RISK_MODEL_KIND, &self.forest)?;
        save_artifact(&config.cluster_model_path(), CLUSTER_MODEL_KIND, &self.clusters)?;
        log::info!("Saved model artifacts to {}", config.model_dir.display());
        Ok(())
    }

    /// Load and verify all three artifacts
    pub fn load(config: &RiskConfig) -> Result<Self, ModelError> {
        let scaler: StandardScaler = load_artifact(&config.scaler_path(), SCALER_KIND)?;
        let forest: RandomForest = load_artifact(&config.risk_model_path(), RISK_MODEL_KIND)?;
        let clusters: KMeans = load_artifact(&config.cluster_model_path(), CLUSTER_MODEL_KIND)?;

        let invalid = |file: &str, reason: &str| ModelError::Invalid {
            artifact: file.to_string(),
            reason: reason.to_string(),
        };
        if !scaler.is_valid() {
            return Err(invalid(SCALER_FILE, "non-finite mean or non-positive scale"));
        }
        if !forest.is_valid() {
            return Err(invalid(RISK_MODEL_FILE, "malformed trees"));
        }
        if !clusters.is_valid() {
            return Err(invalid(CLUSTER_MODEL_FILE, "no usable centroids"));
        }
        if clusters.n_clusters() != config.clustering.n_clusters {
            return Err(invalid(
                CLUSTER_MODEL_FILE,
                &format!("{} centroids, expected {}", clusters.n_clusters(), config.clustering.n_clusters),
            ));
        }

        Ok(Self { scaler, forest, clusters })
    }

    /// Load persisted models, retraining (and persisting) when any artifact
    /// is missing or unusable
    pub fn load_or_train(config: &RiskConfig) -> Result<Self, ModelError> {
        match Self::load(config) {
            Ok(bundle) => {
                log::info!("Loaded model artifacts from {}", config.model_dir.display());
                return Ok(bundle);
            }
            Err(e) => log::warn!("Model artifacts unavailable ({}), retraining", e),
        }

        let (bundle, _) = Self::train(config)?;
        if let Err(e) = bundle.save(config) {
            log::error!("Failed to persist model artifacts: {}", e);
        }
        Ok(bundle)
    }

    /// (class, confidence, cluster) for one raw feature vector
    pub fn classify(&self, vector: &FeatureVector) -> Result<(usize, f64, usize), InferenceError> {
        vector.ensure_finite()?;

        let scaled = self.scaler.transform(vector.as_array());
        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::NonFinite { stage: "scaler", values: scaled.to_vec() });
        }

        let (class, confidence) = self.forest.predict(&scaled);
        if !confidence.is_finite() {
            return Err(InferenceError::NonFinite { stage: "classifier", values: vec![confidence] });
        }

        Ok((class, confidence.clamp(0.0, 1.0), self.clusters.predict(&scaled)))
    }
}

// ============================================================================
// RISK ENGINE
// ============================================================================

/// Shared, read-only predictor
#[derive(Debug, Clone)]
pub struct RiskEngine {
    bundle: Arc<ModelBundle>,
    threshold: ThresholdConfig,
}

impl RiskEngine {
    pub fn new(bundle: Arc<ModelBundle>, threshold: ThresholdConfig) -> Self {
        Self { bundle, threshold }
    }

    /// Load or train the bundle for `config`
    pub fn from_config(config: &RiskConfig) -> Result<Self, ModelError> {
        let bundle = ModelBundle::load_or_train(config)?;
        Ok(Self::new(
            Arc::new(bundle),
            ThresholdConfig::new(config.confidence_threshold),
        ))
    }

    pub fn bundle(&self) -> &Arc<ModelBundle> {
        &self.bundle
    }

    pub fn threshold(&self) -> ThresholdConfig {
        self.threshold
    }

    pub fn try_predict_vector(&self, vector: &FeatureVector) -> Result<RiskResult, InferenceError> {
        let (class, confidence, cluster_group) = self.bundle.classify(vector)?;
        let risk_level = self
            .threshold
            .resolve(class, confidence)
            .ok_or(InferenceError::ClassOutOfRange(class))?;

        Ok(RiskResult { risk_level, confidence, cluster_group })
    }

    pub fn try_predict(&self, record: &ObjectRecord) -> Result<RiskResult, InferenceError> {
        self.try_predict_vector(&FeatureVector::from_record(record)?)
    }

    pub fn try_predict_value(&self, value: &Value) -> Result<RiskResult, InferenceError> {
        self.try_predict(&ObjectRecord::from_value(value)?)
    }

    /// Never fails: errors are logged and degrade to `Unknown`
    pub fn predict(&self, record: &ObjectRecord) -> RiskResult {
        self.try_predict(record).unwrap_or_else(|e| degrade(&e, record))
    }

    /// Same as [`predict`](Self::predict) for a raw JSON object
    pub fn predict_value(&self, value: &Value) -> RiskResult {
        self.try_predict_value(value).unwrap_or_else(|e| degrade(&e, value))
    }
}

fn degrade(error: &InferenceError, input: &dyn std::fmt::Debug) -> RiskResult {
    log::error!("Risk prediction failed at {} stage: {} (input: {:?})", error.stage(), error, input);
    RiskResult::unknown()
}

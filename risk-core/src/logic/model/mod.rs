//! Model Module - Risk Classifier & Cluster Assigner
//!
//! Scaler, random forest and k-means fitted on synthetic data, persisted as
//! checksummed JSON artifacts and served through [`RiskEngine`].

pub mod forest;
pub mod inference;
pub mod kmeans;
pub mod scaler;
pub mod storage;
pub mod threshold;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export common types
pub use inference::{InferenceError, ModelBundle, RiskEngine, TrainingReport};
pub use storage::ModelError;
pub use threshold::ThresholdConfig;
pub use types::{RiskLevel, RiskResult};

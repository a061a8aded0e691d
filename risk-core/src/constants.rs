//! Central Configuration Constants
//!
//! Single source of truth for the pipeline defaults.
//! Every value can be overridden from the environment through the helpers below.

/// Confidence below which a prediction is reported as `Uncertain`
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Number of synthetic samples generated for training
pub const DEFAULT_SAMPLE_COUNT: usize = 5000;

/// Seed for every random source used during training
pub const DEFAULT_SEED: u64 = 42;

/// Directory holding the persisted model artifacts
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Artifact file names (relative to the model directory)
pub const SCALER_FILE: &str = "scaler.json";
pub const RISK_MODEL_FILE: &str = "risk_model.json";
pub const CLUSTER_MODEL_FILE: &str = "cluster_model.json";

/// Response cache lifetime (seconds)
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 3600;

/// Response cache capacity (entries)
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Fraction of the samples held out for evaluation
pub const TEST_SPLIT_RATIO: f64 = 0.2;

/// Library version
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get confidence threshold from environment or use default
pub fn get_confidence_threshold() -> f64 {
    confidence_threshold_from(std::env::var("RISK_CONFIDENCE_THRESHOLD").ok().as_deref())
}

fn confidence_threshold_from(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse().ok())
        .filter(|t: &f64| t.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD)
}

/// Get synthetic sample count from environment or use default
pub fn get_sample_count() -> usize {
    std::env::var("RISK_SAMPLE_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(DEFAULT_SAMPLE_COUNT)
}

/// Get training seed from environment or use default
pub fn get_seed() -> u64 {
    std::env::var("RISK_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

/// Get model directory from environment or use default
pub fn get_model_dir() -> String {
    std::env::var("RISK_MODEL_DIR")
        .unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_threshold_parsing() {
        assert_eq!(confidence_threshold_from(Some("0.45")), 0.45);
        assert_eq!(confidence_threshold_from(Some(" 0.6 ")), 0.6);
        assert_eq!(confidence_threshold_from(None), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(confidence_threshold_from(Some("high")), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(confidence_threshold_from(Some("NaN")), DEFAULT_CONFIDENCE_THRESHOLD);
        assert_eq!(confidence_threshold_from(Some("inf")), DEFAULT_CONFIDENCE_THRESHOLD);
    }
}

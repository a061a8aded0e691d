//! Confidence Threshold
//!
//! Post-hoc override: a prediction whose confidence falls below the
//! threshold is reported as `Uncertain`, whatever class the forest chose.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONFIDENCE_THRESHOLD;
use super::types::RiskLevel;

/// Threshold Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum confidence for a trained band to be reported
    pub min_confidence: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ThresholdConfig {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub fn is_confident(&self, confidence: f64) -> bool {
        confidence >= self.min_confidence
    }

    /// Band for a predicted class; `None` when the class is out of range
    pub fn resolve(&self, class: usize, confidence: f64) -> Option<RiskLevel> {
        let level = RiskLevel::from_class(class)?;
        if self.is_confident(confidence) {
            Some(level)
        } else {
            Some(RiskLevel::Uncertain)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_config() {
        let config = ThresholdConfig::default();
        assert_eq!(config.min_confidence, 0.3);
    }

    #[test]
    fn test_low_confidence_is_uncertain() {
        let config = ThresholdConfig::default();
        assert_eq!(config.resolve(3, 0.29), Some(RiskLevel::Uncertain));
        assert_eq!(config.resolve(3, 0.3), Some(RiskLevel::High));
        assert_eq!(config.resolve(0, 0.9), Some(RiskLevel::Low));
    }

    #[test]
    fn test_unreachable_threshold() {
        let config = ThresholdConfig::new(1.5);
        for class in 0..4 {
            assert_eq!(config.resolve(class, 1.0), Some(RiskLevel::Uncertain));
        }
        assert_eq!(config.resolve(7, 1.0), None);
    }
}

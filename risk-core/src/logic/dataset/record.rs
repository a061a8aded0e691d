use serde::{Deserialize, Serialize};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// One labeled synthetic sample
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrainingSample {
    // Feature contract
    pub feature_version: u8,
    pub layout_hash: u32,
    pub features: [f64; FEATURE_COUNT],

    // Noisy heuristic score and the ordinal label derived from it
    pub risk_score: f64,
    pub label: usize,
}

impl TrainingSample {
    pub fn new(vector: FeatureVector, risk_score: f64, label: usize) -> Self {
        Self {
            feature_version: vector.version,
            layout_hash: vector.layout_hash,
            features: vector.values,
            risk_score,
            label,
        }
    }

    pub fn vector(&self) -> FeatureVector {
        FeatureVector {
            version: self.feature_version,
            layout_hash: self.layout_hash,
            values: self.features,
        }
    }
}

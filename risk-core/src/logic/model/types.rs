//! Risk prediction output types

use serde::{Deserialize, Serialize};

/// Ordinal risk band plus the two non-trained outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    Moderate,
    High,
    /// Confidence fell below the configured threshold
    Uncertain,
    /// Inference failed
    Unknown,
}

impl RiskLevel {
    /// Trained classes in ordinal order
    pub const CLASSES: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::Moderate,
        RiskLevel::High,
    ];

    /// Map an ordinal class index to its band
    pub fn from_class(class: usize) -> Option<Self> {
        Self::CLASSES.get(class).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Uncertain => "Uncertain",
            RiskLevel::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{risk_level, confidence, cluster_group}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub cluster_group: usize,
}

impl RiskResult {
    /// Safe default returned when inference fails
    pub fn unknown() -> Self {
        Self {
            risk_level: RiskLevel::Unknown,
            confidence: 0.0,
            cluster_group: 0,
        }
    }
}

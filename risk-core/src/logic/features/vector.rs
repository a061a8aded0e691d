//! Feature Vector
//!
//! Five floats tagged with the layout they were built for. Built from an [`ObjectRecord`] with the documented defaults applied:
//!
//! | feature            | default                      |
//! |--------------------|------------------------------|
//! | diameter           | 10 m                         |
//! | velocity           | 15 km/s                      |
//! | miss_distance      | 1,000,000 km                 |
//! | absolute_magnitude | 20 − 2.5·log10(diameter)     |
//!
//! `orbital_period` is always derived, never read.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::layout::{
    FEATURE_COUNT, FEATURE_VERSION, FEATURE_LAYOUT,
    layout_hash, validate_layout, LayoutMismatchError,
};
use super::record::{FeatureError, ObjectRecord};

pub const DEFAULT_DIAMETER_M: f64 = 10.0;
pub const DEFAULT_VELOCITY_KM_S: f64 = 15.0;
pub const DEFAULT_MISS_DISTANCE_KM: f64 = 1_000_000.0;

/// Magnitude estimated from diameter when H is unknown
pub fn magnitude_from_diameter(diameter_m: f64) -> f64 {
    20.0 - 2.5 * diameter_m.log10()
}

/// Simplified period proxy shared by training and inference
pub fn orbital_period_proxy(miss_distance_km: f64, velocity_km_s: f64) -> f64 {
    miss_distance_km.powi(3).sqrt() / (velocity_km_s * 1000.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    /// In `FEATURE_LAYOUT` order
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Tag raw values with the current layout
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Build from the four primary attributes, deriving the period
    pub fn from_primary(diameter: f64, velocity: f64, miss_distance: f64, magnitude: f64) -> Self {
        Self::from_values([
            diameter,
            velocity,
            miss_distance,
            magnitude,
            orbital_period_proxy(miss_distance, velocity),
        ])
    }

    /// Apply defaults to a record and derive the period
    pub fn from_record(record: &ObjectRecord) -> Result<Self, FeatureError> {
        let diameter = record.diameter_max_m.unwrap_or(DEFAULT_DIAMETER_M);
        let velocity = record.velocity_km_s.unwrap_or(DEFAULT_VELOCITY_KM_S);
        let miss_distance = record.miss_distance_km.unwrap_or(DEFAULT_MISS_DISTANCE_KM);
        let magnitude = record
            .absolute_magnitude
            .unwrap_or_else(|| magnitude_from_diameter(diameter));

        let vector = Self::from_primary(diameter, velocity, miss_distance, magnitude);
        vector.ensure_finite()?;
        Ok(vector)
    }

    /// Reject NaN / infinite entries before they reach a model
    pub fn ensure_finite(&self) -> Result<(), FeatureError> {
        for (name, value) in FEATURE_LAYOUT.iter().zip(self.values.iter()) {
            if !value.is_finite() {
                return Err(FeatureError::NonFinite { feature: *name, value: *value });
            }
        }
        Ok(())
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Fails for a vector built under another layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Named values plus layout tag, for log lines
    pub fn to_log_entry(&self) -> Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

/// Anything a feature vector can be extracted from
pub trait FeatureExtractor {
    fn extract(&self) -> Result<FeatureVector, FeatureError>;
}

impl FeatureExtractor for ObjectRecord {
    fn extract(&self) -> Result<FeatureVector, FeatureError> {
        FeatureVector::from_record(self)
    }
}

impl FeatureExtractor for Value {
    fn extract(&self) -> Result<FeatureVector, FeatureError> {
        FeatureVector::from_record(&ObjectRecord::from_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primary_derives_period() {
        let vector = FeatureVector::from_primary(100.0, 20.0, 10_000.0, 18.0);
        assert_eq!(vector.values[4], 1_000_000.0 / 20_000.0);
        assert_eq!(vector.get_by_name("velocity"), Some(20.0));
        assert!(vector.validate().is_ok());
    }

    #[test]
    fn test_magnitude_default_uses_diameter() {
        let record = ObjectRecord {
            diameter_max_m: Some(1000.0),
            ..Default::default()
        };
        let vector = FeatureVector::from_record(&record).unwrap();
        assert!((vector.values[3] - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_negative_diameter_is_rejected() {
        let record = ObjectRecord {
            diameter_max_m: Some(-5.0),
            ..Default::default()
        };
        let err = FeatureVector::from_record(&record).unwrap_err();
        assert!(matches!(err, FeatureError::NonFinite { feature: "absolute_magnitude", .. }));
    }

    #[test]
    fn test_to_log_entry() {
        let vector = FeatureVector::from_primary(10.0, 15.0, 1e6, 17.5);
        let log = vector.to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert_eq!(log["named_values"]["diameter"], 10.0);
    }
}

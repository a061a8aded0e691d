//! Object Record - raw NEO attributes
//!
//! Explicit optional-field view over a NeoWs object. Numbers may arrive as
//! JSON numbers or numeric strings; both are accepted. Zero and null are
//! treated as absent so the extractor can substitute its defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// JSON pointers of the attributes the pipeline reads
pub const DIAMETER_POINTER: &str = "/estimated_diameter/meters/estimated_diameter_max";
pub const VELOCITY_POINTER: &str = "/close_approach_data/0/relative_velocity/kilometers_per_second";
pub const MISS_DISTANCE_POINTER: &str = "/close_approach_data/0/miss_distance/kilometers";
pub const MAGNITUDE_POINTER: &str = "/absolute_magnitude_h";

/// Feature extraction errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeatureError {
    #[error("object record must be a JSON object, got {0}")]
    NotAMapping(&'static str),

    #[error("field {field} is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("feature {feature} is not finite: {value}")]
    NonFinite { feature: &'static str, value: f64 },
}

/// Raw object record; every attribute optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Max estimated diameter (m)
    pub diameter_max_m: Option<f64>,
    /// Relative velocity at first close approach (km/s)
    pub velocity_km_s: Option<f64>,
    /// Miss distance at first close approach (km)
    pub miss_distance_km: Option<f64>,
    /// Absolute magnitude H
    pub absolute_magnitude: Option<f64>,
}

impl ObjectRecord {
    /// Build from a NeoWs object (feed entry, lookup result or posted body)
    pub fn from_value(value: &Value) -> Result<Self, FeatureError> {
        if !value.is_object() {
            return Err(FeatureError::NotAMapping(json_kind(value)));
        }

        Ok(Self {
            diameter_max_m: read_number(value, DIAMETER_POINTER, "diameter")?,
            velocity_km_s: read_number(value, VELOCITY_POINTER, "velocity")?,
            miss_distance_km: read_number(value, MISS_DISTANCE_POINTER, "miss_distance")?,
            absolute_magnitude: read_number(value, MAGNITUDE_POINTER, "absolute_magnitude")?,
        })
    }

    /// True when no attribute is populated
    pub fn is_empty(&self) -> bool {
        self.diameter_max_m.is_none()
            && self.velocity_km_s.is_none()
            && self.miss_distance_km.is_none()
            && self.absolute_magnitude.is_none()
    }
}

/// Read a numeric attribute; absent, null, empty and zero all map to `None`
fn read_number(value: &Value, pointer: &str, field: &'static str) -> Result<Option<f64>, FeatureError> {
    let number = match value.pointer(pointer) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().parse::<f64>().map_err(|_| FeatureError::NotNumeric {
            field,
            value: s.clone(),
        })?),
        Some(Value::Bool(false)) => None,
        Some(other) => {
            return Err(FeatureError::NotNumeric { field, value: other.to_string() });
        }
    };

    Ok(number.filter(|n| *n != 0.0))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

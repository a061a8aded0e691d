//! Horizons-backed response bodies

use neo_risk_core::logic::ephemeris::orbital::{orbital_period_days, orbital_stability};
use neo_risk_core::logic::ephemeris::{
    CloseApproach, EarthRiskMetrics, EphemerisResponse, OrbitalElements, OrbitalFeatures,
};
use neo_risk_core::RiskResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct TimeRangeQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub step_size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EphemerisReply {
    pub asteroid_id: String,
    pub designation: String,
    pub ephemeris_data: EphemerisResponse,
    pub time_range: TimeRange,
    pub timestamp: String,
}

/// Elements plus the quantities derived from them
#[derive(Debug, Serialize)]
pub struct DerivedElements {
    #[serde(flatten)]
    pub elements: OrbitalElements,
    pub orbital_period_days: f64,
    pub orbital_stability: f64,
}

impl From<OrbitalElements> for DerivedElements {
    fn from(mut elements: OrbitalElements) -> Self {
        let a = elements.semi_major_axis;
        let e = elements.eccentricity;
        elements.perihelion_distance = a * (1.0 - e);
        elements.aphelion_distance = a * (1.0 + e);

        Self {
            orbital_period_days: orbital_period_days(a),
            orbital_stability: orbital_stability(&elements),
            elements,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrbitalElementsReply {
    pub asteroid_id: String,
    pub designation: String,
    pub orbital_elements: DerivedElements,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct CloseApproachesReply {
    pub asteroid_id: String,
    pub designation: String,
    pub close_approaches: Vec<CloseApproach>,
    /// `null` when no approach is to Earth
    pub risk_metrics: Option<EarthRiskMetrics>,
    pub time_range: TimeRange,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct EnhancedAnalysisReply {
    pub asteroid_id: String,
    pub basic_data: Value,
    pub enhanced_features: OrbitalFeatures,
    pub orbital_elements: OrbitalElements,
    pub close_approaches: Vec<CloseApproach>,
    pub enhanced_risk_prediction: RiskResult,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo_risk_core::logic::ephemeris::orbital::fallback_elements;

    #[test]
    fn test_derived_elements() {
        let mut elements = fallback_elements("2024-01-01");
        elements.semi_major_axis = 2.0;
        elements.eccentricity = 0.5;

        let derived = DerivedElements::from(elements);
        assert!((derived.elements.perihelion_distance - 1.0).abs() < 1e-12);
        assert!((derived.elements.aphelion_distance - 3.0).abs() < 1e-12);
        assert!((derived.orbital_period_days - 365.25 * 2f64.powf(1.5)).abs() < 1e-9);

        let json = serde_json::to_value(&derived).unwrap();
        assert_eq!(json["semi_major_axis"], 2.0);
        assert!(json["orbital_stability"].is_number());
    }
}

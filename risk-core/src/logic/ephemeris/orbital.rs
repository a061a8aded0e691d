//! Orbital mechanics helpers
//!
//! Coarse, closed-form estimates used for the enhanced analysis. None of
//! this propagates an orbit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{CloseApproach, OrbitalElements};

/// Kilometres per astronomical unit
pub const AU_KM: f64 = 149_597_870.7;

/// Fallback close approach when the approach table cannot be fetched
pub const FALLBACK_APPROACH_DISTANCE_KM: f64 = 50_000_000.0;
pub const FALLBACK_APPROACH_VELOCITY_KM_S: f64 = 15.0;

/// Earth approach bands (AU)
pub const HIGH_RISK_DISTANCE_AU: f64 = 0.05;
pub const MEDIUM_RISK_DISTANCE_AU: f64 = 0.1;

/// Kepler's third law, days
pub fn orbital_period_days(semi_major_axis: f64) -> f64 {
    365.25 * semi_major_axis.powf(1.5)
}

/// 0..1, higher for Earth-like, circular, low-inclination orbits
pub fn orbital_stability(elements: &OrbitalElements) -> f64 {
    let axis = 1.0 - (elements.semi_major_axis - 1.0).abs() / 2.0;
    let eccentricity = 1.0 - elements.eccentricity;
    let inclination = 1.0 - elements.inclination.abs() / 90.0;

    (0.4 * axis + 0.4 * eccentricity + 0.2 * inclination).clamp(0.0, 1.0)
}

/// Banded estimate from the closest approach, scaled by velocity and
/// eccentricity, capped at 1
pub fn impact_probability(elements: &OrbitalElements, approaches: &[CloseApproach]) -> f64 {
    let Some(closest) = closest(approaches.iter()) else {
        return 0.0;
    };

    let base = if closest.distance < 0.01 {
        0.1
    } else if closest.distance < 0.05 {
        0.01
    } else if closest.distance < 0.1 {
        0.001
    } else {
        0.0001
    };
    let velocity_factor = (closest.velocity / 30.0).min(2.0);
    let eccentricity_factor = if elements.eccentricity > 0.5 { 1.5 } else { 1.0 };

    (base * velocity_factor * eccentricity_factor).min(1.0)
}

fn closest<'a>(approaches: impl Iterator<Item = &'a CloseApproach>) -> Option<&'a CloseApproach> {
    approaches.min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Elements reported when the service is unavailable
pub fn fallback_elements(epoch: &str) -> OrbitalElements {
    OrbitalElements {
        epoch: epoch.to_string(),
        semi_major_axis: 1.5,
        eccentricity: 0.2,
        inclination: 15.0,
        longitude_of_ascending_node: 0.0,
        argument_of_perihelion: 0.0,
        mean_anomaly: 0.0,
        perihelion_distance: 1.2,
        aphelion_distance: 1.8,
    }
}

pub fn fallback_close_approach(start_date: &str) -> CloseApproach {
    CloseApproach {
        date: start_date.to_string(),
        body: "Earth".to_string(),
        distance: FALLBACK_APPROACH_DISTANCE_KM / AU_KM,
        velocity: FALLBACK_APPROACH_VELOCITY_KM_S,
        uncertainty: None,
        uncertainty_3sigma: None,
    }
}

/// Closest Earth approach summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthRiskMetrics {
    pub closest_earth_approach_au: f64,
    pub closest_earth_approach_km: f64,
    pub closest_earth_approach_velocity: f64,
    pub closest_earth_approach_date: String,
    pub num_earth_approaches: usize,
    pub risk_level: String,
}

pub fn earth_risk_metrics(approaches: &[CloseApproach]) -> Option<EarthRiskMetrics> {
    let earth: Vec<&CloseApproach> = approaches.iter().filter(|a| a.is_earth()).collect();
    let nearest = closest(earth.iter().copied())?;

    let risk_level = if nearest.distance < HIGH_RISK_DISTANCE_AU {
        "HIGH"
    } else if nearest.distance < MEDIUM_RISK_DISTANCE_AU {
        "MEDIUM"
    } else {
        "LOW"
    };

    Some(EarthRiskMetrics {
        closest_earth_approach_au: nearest.distance,
        closest_earth_approach_km: nearest.distance * AU_KM,
        closest_earth_approach_velocity: nearest.velocity,
        closest_earth_approach_date: nearest.date.clone(),
        num_earth_approaches: earth.len(),
        risk_level: risk_level.to_string(),
    })
}

/// Elements and approach statistics combined for the enhanced analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitalFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semi_major_axis: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eccentricity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclination: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude_of_ascending_node: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument_of_perihelion: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_anomaly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbital_period: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbital_stability: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_close_approaches: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest_approach_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest_approach_velocity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_approach_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_approach_velocity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_probability: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_earth_approaches: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest_earth_approach: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_earth_approach_days: Option<i64>,
}

impl OrbitalFeatures {
    pub fn derive(elements: &OrbitalElements, approaches: &[CloseApproach], today: NaiveDate) -> Self {
        let mut features = Self {
            semi_major_axis: Some(elements.semi_major_axis),
            eccentricity: Some(elements.eccentricity),
            inclination: Some(elements.inclination),
            longitude_of_ascending_node: Some(elements.longitude_of_ascending_node),
            argument_of_perihelion: Some(elements.argument_of_perihelion),
            mean_anomaly: Some(elements.mean_anomaly),
            orbital_period: Some(orbital_period_days(elements.semi_major_axis)),
            orbital_stability: Some(orbital_stability(elements)),
            ..Default::default()
        };

        if approaches.is_empty() {
            return features;
        }

        let n = approaches.len() as f64;
        let distances = approaches.iter().map(|a| a.distance);
        let velocities = approaches.iter().map(|a| a.velocity);

        features.num_close_approaches = Some(approaches.len());
        features.closest_approach_distance = distances.clone().reduce(f64::min);
        features.closest_approach_velocity = velocities.clone().reduce(f64::min);
        features.avg_approach_distance = Some(distances.sum::<f64>() / n);
        features.avg_approach_velocity = Some(velocities.sum::<f64>() / n);
        features.impact_probability = Some(impact_probability(elements, approaches));

        let earth: Vec<&CloseApproach> = approaches.iter().filter(|a| a.is_earth()).collect();
        if !earth.is_empty() {
            features.num_earth_approaches = Some(earth.len());
            features.closest_earth_approach = earth.iter().map(|a| a.distance).reduce(f64::min);
            features.next_earth_approach_days = days_until_next(&earth, today);
        }

        features
    }
}

/// Days from `today` to the earliest strictly-later approach date
fn days_until_next(approaches: &[&CloseApproach], today: NaiveDate) -> Option<i64> {
    approaches
        .iter()
        .filter_map(|a| approach_date(&a.date))
        .filter(|date| *date > today)
        .min()
        .map(|date| (date - today).num_days())
}

/// Accepts `2025-03-01` and the Horizons `2025-Mar-01 12:00` form
pub fn approach_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y-%b-%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approach(date: &str, body: &str, distance: f64, velocity: f64) -> CloseApproach {
        CloseApproach {
            date: date.to_string(),
            body: body.to_string(),
            distance,
            velocity,
            uncertainty: None,
            uncertainty_3sigma: None,
        }
    }

    #[test]
    fn test_orbital_period() {
        assert_eq!(orbital_period_days(1.0), 365.25);
        assert!((orbital_period_days(4.0) - 365.25 * 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_orbital_stability() {
        let mut elements = fallback_elements("2025-01-01");
        elements.semi_major_axis = 1.0;
        elements.eccentricity = 0.0;
        elements.inclination = 0.0;
        assert_eq!(orbital_stability(&elements), 1.0);

        elements.semi_major_axis = 10.0;
        elements.eccentricity = 0.99;
        elements.inclination = 170.0;
        assert_eq!(orbital_stability(&elements), 0.0);

        let fallback = fallback_elements("2025-01-01");
        let expected = 0.4 * 0.75 + 0.4 * 0.8 + 0.2 * (1.0 - 15.0 / 90.0);
        assert!((orbital_stability(&fallback) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_impact_probability_bands() {
        let elements = fallback_elements("2025-01-01");
        assert_eq!(impact_probability(&elements, &[]), 0.0);

        let close = [approach("2025-01-01", "Earth", 0.005, 30.0), approach("2025-02-01", "Mars", 0.5, 5.0)];
        assert!((impact_probability(&elements, &close) - 0.1).abs() < 1e-12);

        let mut eccentric = elements.clone();
        eccentric.eccentricity = 0.7;
        let fast = [approach("2025-01-01", "Earth", 0.03, 90.0)];
        assert!((impact_probability(&eccentric, &fast) - 0.01 * 2.0 * 1.5).abs() < 1e-12);

        let far = [approach("2025-01-01", "Earth", 0.2, 15.0)];
        assert!((impact_probability(&elements, &far) - 0.00005).abs() < 1e-12);
    }

    #[test]
    fn test_earth_risk_metrics() {
        assert!(earth_risk_metrics(&[approach("2025-01-01", "Mars", 0.01, 5.0)]).is_none());

        let approaches = [
            approach("2025-01-01", "Earth", 0.08, 12.0),
            approach("2025-06-01", "Earth", 0.04, 20.0),
            approach("2025-03-01", "Venus", 0.001, 20.0),
        ];
        let metrics = earth_risk_metrics(&approaches).unwrap();
        assert_eq!(metrics.risk_level, "HIGH");
        assert_eq!(metrics.num_earth_approaches, 2);
        assert_eq!(metrics.closest_earth_approach_date, "2025-06-01");
        assert!((metrics.closest_earth_approach_km - 0.04 * AU_KM).abs() < 1e-6);

        let medium = earth_risk_metrics(&approaches[..1]).unwrap();
        assert_eq!(medium.risk_level, "MEDIUM");
    }

    #[test]
    fn test_fallback_approach() {
        let fallback = fallback_close_approach("2025-01-01");
        assert!(fallback.is_earth());
        assert!((fallback.distance * AU_KM - 5.0e7).abs() < 1e-6);
        assert_eq!(fallback.velocity, 15.0);
    }

    #[test]
    fn test_derive_features() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let elements = fallback_elements("2025-01-15");
        let approaches = [
            approach("2025-Jan-10 00:00", "Earth", 0.2, 10.0),
            approach("2025-Feb-14 06:30", "Earth", 0.1, 20.0),
            approach("2025-03-01", "Mars", 0.3, 30.0),
        ];

        let features = OrbitalFeatures::derive(&elements, &approaches, today);
        assert_eq!(features.num_close_approaches, Some(3));
        assert_eq!(features.closest_approach_distance, Some(0.1));
        assert_eq!(features.closest_approach_velocity, Some(10.0));
        assert!((features.avg_approach_velocity.unwrap() - 20.0).abs() < 1e-12);
        assert_eq!(features.num_earth_approaches, Some(2));
        assert_eq!(features.next_earth_approach_days, Some(30));

        let bare = OrbitalFeatures::derive(&elements, &[], today);
        assert!(bare.num_close_approaches.is_none());
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("impact_probability").is_none());
        assert!(json.get("orbital_period").is_some());
    }
}

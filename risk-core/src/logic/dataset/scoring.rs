//! Synthetic Risk Scoring Rules
//!
//! The banded heuristic that labels synthetic samples. The classifier learns
//! to approximate it; the bands and weights are a fixed reference behavior.
//! Constants and scoring only, no sampling.

use crate::logic::features::FEATURE_COUNT;

// ============================================================================
// LABEL THRESHOLDS
// ============================================================================

/// At or above this score = High (3)
pub const HIGH_SCORE_MIN: f64 = 6.0;

/// At or above this score = Moderate (2)
pub const MODERATE_SCORE_MIN: f64 = 4.0;

/// At or above this score = Medium (1), below = Low (0)
pub const MEDIUM_SCORE_MIN: f64 = 2.0;

/// Standard deviation of the noise added to each score
pub const LABEL_NOISE_STD: f64 = 0.3;

// ============================================================================
// BANDS
// ============================================================================

/// Size contribution: larger objects are exponentially more dangerous
pub fn size_points(diameter_m: f64) -> f64 {
    if diameter_m > 500.0 {
        4.0
    } else if diameter_m > 200.0 {
        3.0
    } else if diameter_m > 100.0 {
        2.0
    } else if diameter_m > 50.0 {
        1.0
    } else if diameter_m > 20.0 {
        0.5
    } else {
        0.0
    }
}

/// Velocity contribution (impact energy)
pub fn velocity_points(velocity_km_s: f64) -> f64 {
    if velocity_km_s > 25.0 {
        3.0
    } else if velocity_km_s > 20.0 {
        2.0
    } else if velocity_km_s > 15.0 {
        1.0
    } else if velocity_km_s > 10.0 {
        0.5
    } else {
        0.0
    }
}

/// Distance contribution: closer is more dangerous
pub fn distance_points(miss_distance_km: f64) -> f64 {
    if miss_distance_km < 1_000.0 {
        4.0
    } else if miss_distance_km < 5_000.0 {
        3.0
    } else if miss_distance_km < 10_000.0 {
        2.0
    } else if miss_distance_km < 50_000.0 {
        1.0
    } else if miss_distance_km < 100_000.0 {
        0.5
    } else {
        0.0
    }
}

/// Magnitude contribution: brighter means larger
pub fn magnitude_points(absolute_magnitude: f64) -> f64 {
    if absolute_magnitude < 15.0 {
        2.0
    } else if absolute_magnitude < 18.0 {
        1.0
    } else if absolute_magnitude < 22.0 {
        0.5
    } else {
        0.0
    }
}

/// Period contribution: shorter period means more frequent encounters
pub fn period_points(orbital_period: f64) -> f64 {
    if orbital_period < 1.0 {
        1.0
    } else if orbital_period < 2.0 {
        0.5
    } else {
        0.0
    }
}

// ============================================================================
// SCORE → LABEL
// ============================================================================

/// Noise-free score of one feature row (layout order)
pub fn base_risk_score(values: &[f64; FEATURE_COUNT]) -> f64 {
    size_points(values[0])
        + velocity_points(values[1])
        + distance_points(values[2])
        + magnitude_points(values[3])
        + period_points(values[4])
}

/// Ordinal label 0..=3 for a (noisy) score
pub fn label_from_score(score: f64) -> usize {
    if score >= HIGH_SCORE_MIN {
        3
    } else if score >= MODERATE_SCORE_MIN {
        2
    } else if score >= MEDIUM_SCORE_MIN {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges_are_exclusive() {
        assert_eq!(size_points(500.0), 3.0);
        assert_eq!(size_points(500.1), 4.0);
        assert_eq!(size_points(20.0), 0.0);
        assert_eq!(velocity_points(10.0), 0.0);
        assert_eq!(velocity_points(25.5), 3.0);
        assert_eq!(distance_points(1_000.0), 3.0);
        assert_eq!(distance_points(999.0), 4.0);
        assert_eq!(distance_points(100_000.0), 0.0);
        assert_eq!(magnitude_points(22.0), 0.0);
        assert_eq!(magnitude_points(14.9), 2.0);
        assert_eq!(period_points(1.0), 0.5);
        assert_eq!(period_points(2.0), 0.0);
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(label_from_score(6.0), 3);
        assert_eq!(label_from_score(5.99), 2);
        assert_eq!(label_from_score(4.0), 2);
        assert_eq!(label_from_score(2.0), 1);
        assert_eq!(label_from_score(1.99), 0);
        assert_eq!(label_from_score(-0.4), 0);
    }

    #[test]
    fn test_maximum_score() {
        // 600 m, 30 km/s, 500 km, H 14, tiny period
        let values = [600.0, 30.0, 500.0, 14.0, 0.5];
        assert_eq!(base_risk_score(&values), 14.0);
        assert_eq!(label_from_score(base_risk_score(&values)), 3);
    }
}

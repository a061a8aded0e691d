//! Ephemeris and orbit data types

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// One position/velocity sample (AU, AU/day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisPoint {
    pub time: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

/// `{count, ephemeris, timestamp}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisResponse {
    pub count: usize,
    pub ephemeris: Vec<EphemerisPoint>,
    pub timestamp: String,
}

impl EphemerisResponse {
    pub fn from_points(ephemeris: Vec<EphemerisPoint>) -> Self {
        Self {
            count: ephemeris.len(),
            ephemeris,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ephemeris.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepUnit {
    Days,
    Hours,
}

/// Ephemeris step written as `Nd` or `Nh`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSize {
    pub amount: u32,
    pub unit: StepUnit,
}

impl StepSize {
    pub const ONE_DAY: StepSize = StepSize { amount: 1, unit: StepUnit::Days };

    /// Parse `Nd` / `Nh`; anything else (including a zero amount) is one day
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (digits, unit) = if let Some(d) = raw.strip_suffix('d') {
            (d, StepUnit::Days)
        } else if let Some(h) = raw.strip_suffix('h') {
            (h, StepUnit::Hours)
        } else {
            return Self::ONE_DAY;
        };

        match digits.trim().parse::<u32>() {
            Ok(amount) if amount > 0 => Self { amount, unit },
            _ => Self::ONE_DAY,
        }
    }

    pub fn as_duration(&self) -> Duration {
        match self.unit {
            StepUnit::Days => Duration::days(i64::from(self.amount)),
            StepUnit::Hours => Duration::hours(i64::from(self.amount)),
        }
    }
}

impl Default for StepSize {
    fn default() -> Self {
        Self::ONE_DAY
    }
}

impl fmt::Display for StepSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            StepUnit::Days => write!(f, "{}d", self.amount),
            StepUnit::Hours => write!(f, "{}h", self.amount),
        }
    }
}

/// Keplerian elements (AU, degrees)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub epoch: String,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_perihelion: f64,
    pub mean_anomaly: f64,
    pub perihelion_distance: f64,
    pub aphelion_distance: f64,
}

/// One row of a close-approach table; distance in AU, velocity in km/s
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseApproach {
    pub date: String,
    pub body: String,
    pub distance: f64,
    pub velocity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty_3sigma: Option<String>,
}

impl CloseApproach {
    pub fn is_earth(&self) -> bool {
        self.body.contains("Earth")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_size_parse() {
        assert_eq!(StepSize::parse("1d"), StepSize::ONE_DAY);
        assert_eq!(StepSize::parse("6h"), StepSize { amount: 6, unit: StepUnit::Hours });
        assert_eq!(StepSize::parse("10d").as_duration(), Duration::days(10));
        assert_eq!(StepSize::parse("0d"), StepSize::ONE_DAY);
        assert_eq!(StepSize::parse("1w"), StepSize::ONE_DAY);
        assert_eq!(StepSize::parse("xd"), StepSize::ONE_DAY);
        assert_eq!(StepSize::parse("12h").to_string(), "12h");
    }
}

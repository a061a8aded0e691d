//! Ephemeris Module
//!
//! Horizons report parsing, orbit helpers and the fallback synthesizer that
//! keeps ephemeris responses well-formed when the service is unavailable.

pub mod orbital;
pub mod parse;
pub mod synth;
pub mod types;

use thiserror::Error;

pub use orbital::{EarthRiskMetrics, OrbitalFeatures, AU_KM};
pub use synth::{point_count, synthesize, synthesize_from_strings, synthesize_with_rng, MAX_EPHEMERIS_POINTS};
pub use types::{CloseApproach, EphemerisPoint, EphemerisResponse, OrbitalElements, StepSize, StepUnit};

#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("invalid date {value:?}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

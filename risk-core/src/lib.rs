//! NEO Risk Core
//!
//! Feature extraction, synthetic training data, risk scoring and the
//! ephemeris fallback used by the NEO risk server.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────────┐   ┌──────────────┐
//! │  Synthetic   │──▶│ Scaler fit / Forest fit /    │──▶│ models/*.json │
//! │  Generator   │   │ K-means fit                  │   │  (artifacts) │
//! └──────────────┘   └──────────────────────────────┘   └──────┬───────┘
//!                                                              ▼
//!  ObjectRecord ──▶ FeatureVector ──▶ Scaler ──▶ Forest + K-means ──▶ RiskResult
//! ```
//!
//! The ephemeris synthesizer is an independent branch used only when the
//! upstream orbital-mechanics service is unavailable.

pub mod constants;
pub mod logic;

pub use logic::cache::ResponseCache;
pub use logic::config::RiskConfig;
pub use logic::ephemeris::{EphemerisPoint, EphemerisResponse, StepSize};
pub use logic::features::{FeatureVector, ObjectRecord};
pub use logic::model::{ModelBundle, RiskEngine, RiskLevel, RiskResult};

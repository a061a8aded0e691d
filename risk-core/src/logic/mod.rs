//! Logic Module - Risk Pipeline
//!
//! - `features/` - record → versioned feature vector
//! - `dataset/` - seeded synthetic training data
//! - `model/` - scaler, random forest, k-means, persistence, inference
//! - `ephemeris/` - Horizons parsing, orbit helpers, fallback synthesizer
//! - `cache` - bounded response cache for upstream calls

pub mod cache;
pub mod config;
pub mod dataset;
pub mod ephemeris;
pub mod features;
pub mod model;

//! Features Module - Feature Extraction Engine
//!
//! Turns a raw NEO record into the fixed 5-float vector shared by training
//! and inference.

pub mod layout;
pub mod record;
pub mod vector;


// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, CLASS_COUNT};
pub use record::{FeatureError, ObjectRecord};
pub use vector::{FeatureExtractor, FeatureVector};

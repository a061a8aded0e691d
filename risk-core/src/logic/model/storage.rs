//! Model artifact persistence
//!
//! Each artifact is a JSON envelope around its payload:
//!
//! ```json
//! { "kind": "scaler", "feature_version": 1, "layout_hash": 305419896,
//!   "created_at": "...", "checksum": "<sha256 of payload json>", "payload": {...} }
//! ```
//!
//! Loading rejects a wrong kind, a layout from another feature version and
//! a payload whose checksum no longer matches.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::logic::dataset::DatasetError;
use crate::logic::features::layout::{layout_hash, validate_layout, LayoutMismatchError, FEATURE_VERSION};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("checksum mismatch in {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("invalid artifact {artifact}: {reason}")]
    Invalid { artifact: String, reason: String },

    #[error("training failed: {0}")]
    Training(String),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Envelope written around every persisted model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    pub kind: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub created_at: DateTime<Utc>,
    pub checksum: String,
    pub payload: T,
}

impl<T: Serialize> ArtifactEnvelope<T> {
    pub fn new(kind: &str, payload: T) -> Result<Self, ModelError> {
        Ok(Self {
            kind: kind.to_string(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            created_at: Utc::now(),
            checksum: payload_checksum(&payload)?,
            payload,
        })
    }
}

/// SHA-256 (hex) of the payload's compact JSON
pub fn payload_checksum<T: Serialize>(payload: &T) -> Result<String, ModelError> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Write an artifact, creating the parent directory
pub fn save_artifact<T: Serialize>(path: &Path, kind: &str, payload: &T) -> Result<(), ModelError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let envelope = ArtifactEnvelope::new(kind, payload)?;
    fs::write(path, serde_json::to_vec(&envelope)?)?;
    log::debug!("Saved {} artifact to {}", kind, path.display());
    Ok(())
}

/// Read and verify an artifact
pub fn load_artifact<T>(path: &Path, kind: &str) -> Result<T, ModelError>
where
    T: Serialize + DeserializeOwned,
{
    let data = fs::read(path)?;
    let envelope: ArtifactEnvelope<T> = serde_json::from_slice(&data)?;

    if envelope.kind != kind {
        return Err(ModelError::Invalid {
            artifact: path.display().to_string(),
            reason: format!("expected kind {}, found {}", kind, envelope.kind),
        });
    }

    validate_layout(envelope.feature_version, envelope.layout_hash)?;

    let actual = payload_checksum(&envelope.payload)?;
    if actual != envelope.checksum {
        return Err(ModelError::ChecksumMismatch {
            artifact: path.display().to_string(),
            expected: envelope.checksum,
            actual,
        });
    }

    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        weights: Vec<f64>,
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let payload = Payload { weights: vec![0.1, 1.0 / 3.0, -2.5e-8] };

        save_artifact(&path, "test", &payload).unwrap();
        let loaded: Payload = load_artifact(&path, "test").unwrap();
        assert_eq!(loaded, payload);
    }

    #[test]
    fn test_wrong_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save_artifact(&path, "scaler", &Payload { weights: vec![] }).unwrap();

        let err = load_artifact::<Payload>(&path, "risk_model").unwrap_err();
        assert!(matches!(err, ModelError::Invalid { .. }));
    }

    #[test]
    fn test_tampered_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save_artifact(&path, "test", &Payload { weights: vec![1.0] }).unwrap();

        let mut value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        value["payload"] = json!({ "weights": [2.0] });
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = load_artifact::<Payload>(&path, "test").unwrap_err();
        assert!(matches!(err, ModelError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_layout_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save_artifact(&path, "test", &Payload { weights: vec![1.0] }).unwrap();

        let mut value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        value["feature_version"] = json!(FEATURE_VERSION + 1);
        fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = load_artifact::<Payload>(&path, "test").unwrap_err();
        assert!(matches!(err, ModelError::LayoutMismatch(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_artifact::<Payload>(&dir.path().join("absent.json"), "test").unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }
}

//! Feature Layout
//!
//! Order and names of the five model inputs. Training and inference both
//! read from here, and every persisted artifact carries the version and
//! CRC32 of this layout. Any change to the list (add, remove, reorder)
//! needs a `FEATURE_VERSION` bump; old artifacts then fail to load and the
//! models are retrained.

use crc32fast::Hasher;
use thiserror::Error;

pub const FEATURE_VERSION: u8 = 1;

/// Vector order
pub const FEATURE_LAYOUT: &[&str] = &[
    "diameter",           // max estimated diameter, m
    "velocity",           // relative velocity at first close approach, km/s
    "miss_distance",      // miss distance at first close approach, km
    "absolute_magnitude", // H
    "orbital_period",     // sqrt(miss_distance^3) / (velocity * 1000)
];

pub const FEATURE_COUNT: usize = 5;

/// Ordinal risk bands the classifier is trained on
pub const CLASS_COUNT: usize = 4;

/// CRC32 over the version byte and the NUL-terminated names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

#[derive(Debug, Clone, Error)]
#[error(
    "artifact built for feature layout v{found_version} ({found_hash:08x}), \
     this build uses v{expected_version} ({expected_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub found_version: u8,
    pub found_hash: u32,
}

pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    let expected_hash = layout_hash();
    if version == FEATURE_VERSION && hash == expected_hash {
        return Ok(());
    }
    Err(LayoutMismatchError {
        expected_version: FEATURE_VERSION,
        expected_hash,
        found_version: version,
        found_hash: hash,
    })
}

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_len_matches_count() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_is_stable() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());

        let err = validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).unwrap_err();
        assert_eq!(err.expected_hash, layout_hash());
        assert_eq!(err.found_version, FEATURE_VERSION);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("diameter"), Some(0));
        assert_eq!(feature_index("orbital_period"), Some(4));
        assert_eq!(feature_index("semi_major_axis"), None);
    }
}

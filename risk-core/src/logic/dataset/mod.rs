//! Dataset Module - Synthetic Training Data
//!
//! Generates the labeled NEO samples the classifier and clusterer are fit on
//! and packs them into an `ndarray` matrix with a seeded train/test split.

pub mod generator;
pub mod record;
pub mod scoring;


use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::logic::features::{CLASS_COUNT, FEATURE_COUNT};

pub use generator::SyntheticGenerator;
pub use record::TrainingSample;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset is empty")]
    Empty,

    #[error("invalid distribution: {0}")]
    Distribution(String),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("label {0} out of range")]
    LabelOutOfRange(usize),
}

/// Feature matrix (rows = samples, columns = FEATURE_LAYOUT) plus labels
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, labels: Vec<usize>) -> Result<Self, DatasetError> {
        if features.nrows() == 0 {
            return Err(DatasetError::Empty);
        }
        if let Some(bad) = labels.iter().find(|&&l| l >= CLASS_COUNT) {
            return Err(DatasetError::LabelOutOfRange(*bad));
        }
        if features.nrows() != labels.len() || features.ncols() != FEATURE_COUNT {
            return Err(DatasetError::Shape(ndarray::ShapeError::from_kind(
                ndarray::ErrorKind::IncompatibleShape,
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn from_samples(samples: &[TrainingSample]) -> Result<Self, DatasetError> {
        let flat: Vec<f64> = samples.iter().flat_map(|s| s.features).collect();
        let features = Array2::from_shape_vec((samples.len(), FEATURE_COUNT), flat)?;
        let labels = samples.iter().map(|s| s.label).collect();
        Self::new(features, labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Count of samples per ordinal class
    pub fn label_distribution(&self) -> [usize; CLASS_COUNT] {
        let mut counts = [0usize; CLASS_COUNT];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Deterministic shuffled split; the test part gets ceil(n * ratio) rows
    pub fn split(&self, test_ratio: f64, seed: u64) -> Result<(Dataset, Dataset), DatasetError> {
        let n = self.len();
        let test_len = ((n as f64) * test_ratio.clamp(0.0, 1.0)).ceil() as usize;
        if test_len == 0 || test_len >= n {
            return Err(DatasetError::Empty);
        }

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));
        let (test_idx, train_idx) = indices.split_at(test_len);

        Ok((self.subset(train_idx)?, self.subset(test_idx)?))
    }

    fn subset(&self, indices: &[usize]) -> Result<Dataset, DatasetError> {
        let features = self.features.select(Axis(0), indices);
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        Dataset::new(features, labels)
    }
}

/// Copy matrix rows into fixed-size arrays
pub fn matrix_rows(matrix: &Array2<f64>) -> Vec<[f64; FEATURE_COUNT]> {
    matrix
        .rows()
        .into_iter()
        .map(|row| {
            let mut values = [0.0; FEATURE_COUNT];
            for (slot, v) in values.iter_mut().zip(row.iter()) {
                *slot = *v;
            }
            values
        })
        .collect()
}

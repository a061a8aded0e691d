//! Standard Scaler
//!
//! Per-feature zero mean / unit variance. Population standard deviation;
//! a constant column keeps scale 1 so it passes through centered.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::logic::features::FEATURE_COUNT;
use super::ModelError;

/// Fitted normalization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Fit on a feature matrix (rows = samples)
    pub fn fit(features: &Array2<f64>) -> Result<Self, ModelError> {
        if features.nrows() == 0 || features.ncols() != FEATURE_COUNT {
            return Err(ModelError::Training(format!(
                "scaler needs a non-empty {}-column matrix, got {:?}",
                FEATURE_COUNT,
                features.shape()
            )));
        }

        let means = features
            .mean_axis(Axis(0))
            .ok_or_else(|| ModelError::Training("empty matrix".to_string()))?;
        let stds = features.std_axis(Axis(0), 0.0);

        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            mean[i] = means[i];
            if stds[i] > f64::EPSILON {
                scale[i] = stds[i];
            }
        }

        Ok(Self { mean, scale })
    }

    /// Standardize one vector
    pub fn transform(&self, values: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = (values[i] - self.mean[i]) / self.scale[i];
        }
        out
    }

    /// Standardize a whole matrix
    pub fn transform_matrix(&self, features: &Array2<f64>) -> Array2<f64> {
        let mut out = features.clone();
        for mut row in out.rows_mut() {
            for (i, v) in row.iter_mut().enumerate() {
                *v = (*v - self.mean[i]) / self.scale[i];
            }
        }
        out
    }

    /// True when every parameter is finite and every scale positive
    pub fn is_valid(&self) -> bool {
        self.mean.iter().all(|m| m.is_finite())
            && self.scale.iter().all(|s| s.is_finite() && *s > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform() {
        let data = array![
            [1.0, 10.0, 5.0, 0.0, 2.0],
            [3.0, 30.0, 5.0, 0.0, 4.0],
        ];
        let scaler = StandardScaler::fit(&data).unwrap();

        assert_eq!(scaler.mean, [2.0, 20.0, 5.0, 0.0, 3.0]);
        assert_eq!(scaler.scale, [1.0, 10.0, 1.0, 1.0, 1.0]);

        let out = scaler.transform(&[3.0, 30.0, 5.0, 0.0, 2.0]);
        assert_eq!(out, [1.0, 1.0, 0.0, 0.0, -1.0]);

        let matrix = scaler.transform_matrix(&data);
        assert_eq!(matrix.row(0).to_vec(), vec![-1.0, -1.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let data = Array2::<f64>::zeros((3, 2));
        assert!(StandardScaler::fit(&data).is_err());
    }
}

//! K-means Cluster Assigner
//!
//! Lloyd iterations from k-means++ seeds, restarted `n_init` times; the run
//! with the lowest inertia is kept. Fit independently of labels.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::logic::dataset::matrix_rows;
use crate::logic::features::FEATURE_COUNT;
use ndarray::{Array2, Axis};
use super::ModelError;

type Point = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansParams {
    pub n_clusters: usize,
    pub n_init: usize,
    pub max_iter: usize,
    /// Relative to the mean feature variance
    pub tol: f64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
        }
    }
}

/// Fitted centroids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeans {
    pub centroids: Vec<Point>,
    pub inertia: f64,
    pub n_iter: usize,
}

impl KMeans {
    pub fn fit(x: &Array2<f64>, params: &KMeansParams, seed: u64) -> Result<Self, ModelError> {
        let k = params.n_clusters;
        if k == 0 || x.nrows() < k || x.ncols() != FEATURE_COUNT {
            return Err(ModelError::Training(format!(
                "k-means needs at least {} rows of {} features, got {:?}",
                k,
                FEATURE_COUNT,
                x.shape()
            )));
        }

        let points = matrix_rows(x);
        let mean_variance = x.var_axis(Axis(0), 0.0).mean().unwrap_or(0.0);
        let tol = params.tol * mean_variance;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut best: Option<KMeans> = None;
        for run in 0..params.n_init.max(1) {
            let fitted = lloyd(&points, init_plus_plus(&points, k, &mut rng), params.max_iter, tol);
            log::debug!("k-means run {}: inertia {:.4} after {} iterations", run, fitted.inertia, fitted.n_iter);

            if best.as_ref().map_or(true, |b| fitted.inertia < b.inertia) {
                best = Some(fitted);
            }
        }

        best.ok_or_else(|| ModelError::Training("k-means produced no run".to_string()))
    }

    /// Index of the nearest centroid
    pub fn predict(&self, point: &Point) -> usize {
        nearest(point, &self.centroids).0
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_valid(&self) -> bool {
        !self.centroids.is_empty() && self.centroids.iter().flatten().all(|v| v.is_finite())
    }
}

/// k-means++: first centre uniform, then proportional to squared distance
fn init_plus_plus(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let index = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            // All points coincide with a centre
            Err(_) => rng.gen_range(0..points.len()),
        };
        centroids.push(points[index]);
    }

    centroids
}

fn lloyd(points: &[Point], mut centroids: Vec<Point>, max_iter: usize, tol: f64) -> KMeans {
    let k = centroids.len();
    let mut n_iter = 0;

    for _ in 0..max_iter {
        n_iter += 1;

        let mut sums = vec![[0.0; FEATURE_COUNT]; k];
        let mut counts = vec![0usize; k];
        for p in points {
            let c = nearest(p, &centroids).0;
            counts[c] += 1;
            for (s, v) in sums[c].iter_mut().zip(p.iter()) {
                *s += v;
            }
        }

        let mut shift = 0.0;
        for c in 0..k {
            // Empty cluster keeps its previous centre
            if counts[c] == 0 {
                continue;
            }
            let mut updated = [0.0; FEATURE_COUNT];
            for (u, s) in updated.iter_mut().zip(sums[c].iter()) {
                *u = s / counts[c] as f64;
            }
            shift += squared_distance(&updated, &centroids[c]);
            centroids[c] = updated;
        }

        if shift <= tol {
            break;
        }
    }

    let inertia = points.iter().map(|p| nearest(p, &centroids).1).sum();
    KMeans { centroids, inertia, n_iter }
}

/// (index, squared distance) of the closest centroid; first wins ties
fn nearest(point: &Point, centroids: &[Point]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Array2<f64> {
        let centres = [-6.0, -3.0, 0.0, 3.0, 6.0];
        let mut rows = Vec::new();
        for (i, c) in centres.iter().enumerate() {
            for j in 0..20 {
                let jitter = (j as f64 - 10.0) * 0.01;
                rows.extend_from_slice(&[c + jitter, -c, jitter, i as f64 * 0.1, 0.0]);
            }
        }
        Array2::from_shape_vec((100, FEATURE_COUNT), rows).unwrap()
    }

    #[test]
    fn test_finds_five_blobs() {
        let x = blobs();
        let model = KMeans::fit(&x, &KMeansParams::default(), 42).unwrap();

        assert_eq!(model.n_clusters(), 5);
        assert!(model.is_valid());

        // Every blob maps to a single cluster, and blobs map to distinct clusters
        let rows = matrix_rows(&x);
        let mut seen = Vec::new();
        for blob in rows.chunks(20) {
            let label = model.predict(&blob[0]);
            assert!(blob.iter().all(|p| model.predict(p) == label));
            assert!(!seen.contains(&label));
            seen.push(label);
        }
    }

    #[test]
    fn test_deterministic() {
        let x = blobs();
        let a = KMeans::fit(&x, &KMeansParams::default(), 3).unwrap();
        let b = KMeans::fit(&x, &KMeansParams::default(), 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_rows() {
        let x = Array2::<f64>::zeros((3, FEATURE_COUNT));
        assert!(KMeans::fit(&x, &KMeansParams::default(), 42).is_err());
    }

    #[test]
    fn test_identical_points() {
        let x = Array2::<f64>::ones((10, FEATURE_COUNT));
        let model = KMeans::fit(&x, &KMeansParams::default(), 42).unwrap();
        assert_eq!(model.inertia, 0.0);
        assert_eq!(model.predict(&[1.0; FEATURE_COUNT]), 0);
    }
}

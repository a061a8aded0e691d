//! Random Forest Classifier
//!
//! Bagged CART trees with Gini impurity and a random feature subset per
//! split. Trees are stored as flat node arenas so the whole forest
//! serializes to plain JSON.
//!
//! `predict_proba` averages the class distribution of the leaf each tree
//! routes the sample to; the predicted class is the first maximum.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::logic::features::{CLASS_COUNT, FEATURE_COUNT};
use super::ModelError;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
        }
    }
}

impl ForestParams {
    /// Features considered at each split: floor(sqrt(n)), at least 1
    pub fn max_features(&self) -> usize {
        ((FEATURE_COUNT as f64).sqrt() as usize).max(1)
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        distribution: [f64; CLASS_COUNT],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One CART tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    params: &'a ForestParams,
    nodes: Vec<Node>,
    importances: [f64; FEATURE_COUNT],
}

impl<'a> TreeBuilder<'a> {
    fn build(&mut self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let counts = class_counts(self.y, &indices);
        let n = indices.len();
        let impurity = gini(&counts, n);

        let slot = self.nodes.len();
        self.nodes.push(leaf(&counts, n));

        if depth >= self.params.max_depth
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || impurity <= 0.0
        {
            return slot;
        }

        let Some(best) = self.best_split(&indices, impurity, rng) else {
            return slot;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[[i, best.feature]] <= best.threshold);

        self.importances[best.feature] += best.decrease;

        let left = self.build(left_idx, depth + 1, rng);
        let right = self.build(right_idx, depth + 1, rng);
        self.nodes[slot] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        slot
    }

    /// Best Gini split over a random feature subset. When none of the first
    /// `max_features` features admits a split, the search continues through
    /// the remaining ones.
    fn best_split(&self, indices: &[usize], impurity: f64, rng: &mut StdRng) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
        order.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for (visited, &feature) in order.iter().enumerate() {
            if visited >= self.params.max_features() && best.is_some() {
                break;
            }

            sorted.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let total = class_counts(self.y, &sorted);
            let mut left = [0usize; CLASS_COUNT];

            for k in 0..n - 1 {
                left[self.y[sorted[k]]] += 1;

                let left_n = k + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let here = self.x[[sorted[k], feature]];
                let next = self.x[[sorted[k + 1], feature]];
                if here >= next {
                    continue;
                }

                let mut right = [0usize; CLASS_COUNT];
                for c in 0..CLASS_COUNT {
                    right[c] = total[c] - left[c];
                }

                let weighted = (left_n as f64 * gini(&left, left_n)
                    + right_n as f64 * gini(&right, right_n))
                    / n as f64;
                let decrease = (impurity - weighted) * n as f64;

                if decrease > 0.0 && best.as_ref().map_or(true, |b| decrease > b.decrease) {
                    let mut threshold = (here + next) / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(SplitCandidate { feature, threshold, decrease });
                }
            }
        }

        best
    }
}

impl DecisionTree {
    /// Fit on the given (bootstrap) rows
    fn fit(
        x: &Array2<f64>,
        y: &[usize],
        indices: Vec<usize>,
        params: &ForestParams,
        rng: &mut StdRng,
    ) -> (Self, [f64; FEATURE_COUNT]) {
        let mut builder = TreeBuilder {
            x,
            y,
            params,
            nodes: Vec::new(),
            importances: [0.0; FEATURE_COUNT],
        };
        builder.build(indices, 0, rng);
        (Self { nodes: builder.nodes }, builder.importances)
    }

    /// Class distribution of the leaf a sample lands in
    pub fn leaf_distribution(&self, row: &[f64; FEATURE_COUNT]) -> Option<&[f64; CLASS_COUNT]> {
        let mut index = 0;
        loop {
            match self.nodes.get(index)? {
                Node::Leaf { distribution } => return Some(distribution),
                Node::Split { feature, threshold, left, right } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Children point forward, features in range, leaves are distributions
    fn is_valid(&self) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(i, node)| match node {
                Node::Leaf { distribution } => distribution.iter().all(|p| p.is_finite() && *p >= 0.0),
                Node::Split { feature, threshold, left, right } => {
                    *feature < FEATURE_COUNT
                        && threshold.is_finite()
                        && *left > i
                        && *right > i
                        && *left < self.nodes.len()
                        && *right < self.nodes.len()
                }
            })
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub params: ForestParams,
    pub trees: Vec<DecisionTree>,
    /// Mean impurity decrease per feature, normalized to sum 1
    pub feature_importances: [f64; FEATURE_COUNT],
}

impl RandomForest {
    /// Fit on standardized features and ordinal labels
    pub fn fit(x: &Array2<f64>, y: &[usize], params: &ForestParams, seed: u64) -> Result<Self, ModelError> {
        let n = x.nrows();
        if n == 0 || n != y.len() || x.ncols() != FEATURE_COUNT {
            return Err(ModelError::Training(format!(
                "forest needs matching rows and labels, got {:?} and {}",
                x.shape(),
                y.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(ModelError::Training("forest needs at least one tree".to_string()));
        }
        if let Some(bad) = y.iter().find(|&&c| c >= CLASS_COUNT) {
            return Err(ModelError::Training(format!("label {} out of range", bad)));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        let mut importances = [0.0; FEATURE_COUNT];

        for _ in 0..params.n_trees {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let (tree, tree_importances) = DecisionTree::fit(x, y, bootstrap, params, &mut rng);

            let total: f64 = tree_importances.iter().sum();
            if total > 0.0 {
                for (acc, v) in importances.iter_mut().zip(tree_importances.iter()) {
                    *acc += v / total;
                }
            }
            trees.push(tree);
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        log::debug!(
            "Fitted {} trees, max depth {}",
            trees.len(),
            trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
        );

        Ok(Self {
            params: params.clone(),
            trees,
            feature_importances: importances,
        })
    }

    /// Mean leaf distribution across trees
    pub fn predict_proba(&self, row: &[f64; FEATURE_COUNT]) -> [f64; CLASS_COUNT] {
        let mut proba = [0.0; CLASS_COUNT];
        let mut used = 0usize;

        for distribution in self.trees.iter().filter_map(|t| t.leaf_distribution(row)) {
            for (acc, p) in proba.iter_mut().zip(distribution.iter()) {
                *acc += p;
            }
            used += 1;
        }

        if used > 0 {
            proba.iter_mut().for_each(|p| *p /= used as f64);
        }
        proba
    }

    /// (class, confidence) where confidence is the max class probability
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> (usize, f64) {
        argmax(&self.predict_proba(row))
    }

    /// Fraction of rows predicted correctly
    pub fn accuracy(&self, x: &Array2<f64>, y: &[usize]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let correct = crate::logic::dataset::matrix_rows(x)
            .iter()
            .zip(y.iter())
            .filter(|(row, &label)| self.predict(row).0 == label)
            .count();
        correct as f64 / y.len() as f64
    }

    pub fn is_valid(&self) -> bool {
        !self.trees.is_empty() && self.trees.iter().all(DecisionTree::is_valid)
    }
}

/// First maximum wins ties
pub fn argmax(proba: &[f64; CLASS_COUNT]) -> (usize, f64) {
    let mut best = (0, proba[0]);
    for (i, &p) in proba.iter().enumerate().skip(1) {
        if p > best.1 {
            best = (i, p);
        }
    }
    best
}

fn class_counts(y: &[usize], indices: &[usize]) -> [usize; CLASS_COUNT] {
    let mut counts = [0usize; CLASS_COUNT];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize; CLASS_COUNT], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

fn leaf(counts: &[usize; CLASS_COUNT], n: usize) -> Node {
    let mut distribution = [0.0; CLASS_COUNT];
    if n > 0 {
        for (d, &c) in distribution.iter_mut().zip(counts.iter()) {
            *d = c as f64 / n as f64;
        }
    }
    Node::Leaf { distribution }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well separated groups; features 1 and 3 are constant
    fn separable() -> (Array2<f64>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let v = i as f64 * 0.01;
            rows.extend_from_slice(&[-2.0 - v, 0.0, -1.0 - v, 0.0, -3.0 - v]);
            labels.push(0);
            rows.extend_from_slice(&[2.0 + v, 0.0, 1.0 + v, 0.0, 3.0 + v]);
            labels.push(3);
        }
        (Array2::from_shape_vec((80, FEATURE_COUNT), rows).unwrap(), labels)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 25,
            ..Default::default()
        }
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[5, 0, 0, 0], 5), 0.0);
        assert!((gini(&[2, 2, 0, 0], 4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_argmax_first_max_wins() {
        assert_eq!(argmax(&[0.25, 0.25, 0.25, 0.25]), (0, 0.25));
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), (1, 0.4));
    }

    #[test]
    fn test_fit_separable() {
        let (x, y) = separable();
        let forest = RandomForest::fit(&x, &y, &small_params(), 42).unwrap();

        assert_eq!(forest.trees.len(), 25);
        assert!(forest.is_valid());
        assert_eq!(forest.accuracy(&x, &y), 1.0);

        let (class, confidence) = forest.predict(&[5.0, 0.0, 5.0, 0.0, 5.0]);
        assert_eq!(class, 3);
        assert_eq!(confidence, 1.0);
    }

    #[test]
    fn test_proba_sums_to_one() {
        let (x, y) = separable();
        let forest = RandomForest::fit(&x, &y, &small_params(), 7).unwrap();

        let proba = forest.predict_proba(&[0.1, 0.0, 0.2, 0.0, 0.0]);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_importances_normalized() {
        let (x, y) = separable();
        let forest = RandomForest::fit(&x, &y, &small_params(), 42).unwrap();

        let total: f64 = forest.feature_importances.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(forest.feature_importances[1], 0.0);
        assert_eq!(forest.feature_importances[3], 0.0);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = separable();
        let a = RandomForest::fit(&x, &y, &small_params(), 42).unwrap();
        let b = RandomForest::fit(&x, &y, &small_params(), 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_depth_is_bounded() {
        let (x, y) = separable();
        let params = ForestParams {
            n_trees: 5,
            max_depth: 1,
            ..Default::default()
        };
        let forest = RandomForest::fit(&x, &y, &params, 42).unwrap();
        assert!(forest.trees.iter().all(|t| t.depth() <= 1));
    }

    #[test]
    fn test_rejects_bad_labels() {
        let (x, mut y) = separable();
        y[0] = 9;
        assert!(RandomForest::fit(&x, &y, &small_params(), 42).is_err());
    }
}

//! CART decision tree used as the base learner of both ensembles.
//!
//! Classification trees are binary: labels must be 0 or 1 and every leaf
//! stores the fraction of positive samples that reached it, which doubles as
//! the positive-class probability. Regression trees (the gradient boosting
//! base learner) store the leaf mean.

use crate::error::{Result, ScreenerError};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Node count above which candidate features are scanned in parallel
const PARALLEL_SPLIT_THRESHOLD: usize = 4096;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Criterion {
    /// Gini impurity (binary classification)
    Gini,
    /// Mean squared error (regression)
    MSE,
}

/// Running sums over the labels of a node
#[derive(Debug, Clone, Copy, Default)]
struct NodeStats {
    count: usize,
    sum: f64,
    sq_sum: f64,
}

impl NodeStats {
    fn push(&mut self, y: f64) {
        self.count += 1;
        self.sum += y;
        self.sq_sum += y * y;
    }

    fn minus(&self, other: &NodeStats) -> NodeStats {
        NodeStats {
            count: self.count - other.count,
            sum: self.sum - other.sum,
            sq_sum: self.sq_sum - other.sq_sum,
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        match criterion {
            // With 0/1 labels, sum is the positive count
            Criterion::Gini => {
                let p = self.sum / n;
                2.0 * p * (1.0 - p)
            }
            Criterion::MSE => (self.sq_sum / n - (self.sum / n).powi(2)).max(0.0),
        }
    }
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered at each split (all when `None`)
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    /// Seed for per-node feature sampling
    pub random_state: Option<u64>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new_classifier()
    }
}

impl DecisionTree {
    /// Create a binary classification tree
    pub fn new_classifier() -> Self {
        Self::with_criterion_inner(Criterion::Gini)
    }

    /// Create a regression tree
    pub fn new_regressor() -> Self {
        Self::with_criterion_inner(Criterion::MSE)
    }

    fn with_criterion_inner(criterion: Criterion) -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion,
            random_state: None,
            n_features: 0,
            feature_importances: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn is_classifier(&self) -> bool {
        self.criterion == Criterion::Gini
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(ScreenerError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ScreenerError::ValidationError(
                "cannot fit a tree on zero samples".to_string(),
            ));
        }
        if self.is_classifier() && y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(ScreenerError::ValidationError(
                "classification labels must be 0 or 1".to_string(),
            ));
        }

        self.n_features = n_features;
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(0));
        let mut importances = vec![0.0; n_features];

        let indices: Vec<usize> = (0..n_samples).collect();
        let root = self.build_tree(x, y, &indices, 0, &mut importances, &mut rng);
        self.root = Some(root);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn stats_of(y: &Array1<f64>, indices: &[usize]) -> NodeStats {
        let mut stats = NodeStats::default();
        for &i in indices {
            stats.push(y[i]);
        }
        stats
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let stats = Self::stats_of(y, indices);
        let impurity = stats.impurity(self.criterion);
        let leaf = TreeNode::Leaf {
            value: stats.mean(),
            n_samples,
        };

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || impurity <= f64::EPSILON;
        if should_stop {
            return leaf;
        }

        let Some((feature_idx, threshold, gain)) = self.find_best_split(x, y, indices, &stats, rng)
        else {
            return leaf;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        importances[feature_idx] += n_samples as f64 * gain;

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    /// Best (feature, threshold, impurity decrease) over a random subset of
    /// features, found by sorting each feature once and sweeping thresholds.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent: &NodeStats,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, f64)> {
        let n_features = x.ncols();
        let k = self.max_features.unwrap_or(n_features).min(n_features);
        let mut candidates: Vec<usize> = if k < n_features {
            sample(rng, n_features, k).into_vec()
        } else {
            (0..n_features).collect()
        };
        candidates.sort_unstable();

        let parent_impurity = parent.impurity(self.criterion);
        let scan = |&feature_idx: &usize| self.scan_feature(x, y, indices, parent, parent_impurity, feature_idx);

        let results: Vec<Option<(usize, f64, f64)>> = if indices.len() >= PARALLEL_SPLIT_THRESHOLD {
            candidates.par_iter().map(scan).collect()
        } else {
            candidates.iter().map(scan).collect()
        };

        // Strict comparison keeps the lowest feature index on ties
        results.into_iter().flatten().fold(None, |best, cand| match best {
            Some((_, _, best_gain)) if cand.2 <= best_gain => best,
            _ => Some(cand),
        })
    }

    fn scan_feature(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent: &NodeStats,
        parent_impurity: f64,
        feature_idx: usize,
    ) -> Option<(usize, f64, f64)> {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (x[[i, feature_idx]], y[i])).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let n = indices.len() as f64;
        let mut left = NodeStats::default();
        let mut best: Option<(f64, f64)> = None;

        for w in 0..pairs.len() - 1 {
            left.push(pairs[w].1);
            let (value, next) = (pairs[w].0, pairs[w + 1].0);
            if value == next {
                continue;
            }
            let right = parent.minus(&left);
            if left.count < self.min_samples_leaf || right.count < self.min_samples_leaf {
                continue;
            }
            let weighted = (left.count as f64 * left.impurity(self.criterion)
                + right.count as f64 * right.impurity(self.criterion))
                / n;
            let gain = parent_impurity - weighted;
            if gain > best.map_or(1e-12, |b| b.1) {
                best = Some(((value + next) / 2.0, gain));
            }
        }

        best.map(|(threshold, gain)| (feature_idx, threshold, gain))
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<&TreeNode> {
        let root = self.root.as_ref().ok_or(ScreenerError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(ScreenerError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(root)
    }

    /// Raw leaf values: positive fraction for classifiers, mean for regressors
    pub fn predict_values(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.check_input(x)?;
        Ok(x.rows().into_iter().map(|row| Self::predict_sample(root, &row)).collect())
    }

    /// Positive-class probability (classification only)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_classifier() {
            return Err(ScreenerError::ValidationError(
                "predict_proba is only available for classification".to_string(),
            ));
        }
        self.predict_values(x)
    }

    /// Class labels for classifiers, leaf means for regressors
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let values = self.predict_values(x)?;
        if self.is_classifier() {
            Ok(values.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
        } else {
            Ok(values)
        }
    }

    fn predict_sample(node: &TreeNode, sample: &ArrayView1<f64>) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_separable() {
        let x = array![[0.0, 5.0], [1.0, 5.0], [2.0, 5.0], [10.0, 5.0], [11.0, 5.0], [12.0, 5.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        let proba = tree.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|&p| p == 0.0 || p == 1.0));
    }

    #[test]
    fn test_leaf_probability_is_positive_fraction() {
        let x = array![[1.0], [1.0], [1.0], [1.0]];
        let y = array![1.0, 0.0, 0.0, 0.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&array![[1.0]]).unwrap();
        assert!((proba[0] - 0.25).abs() < 1e-12);
        assert_eq!(tree.predict(&array![[1.0]]).unwrap()[0], 0.0);
    }

    #[test]
    fn test_rejects_non_binary_labels() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0, 2.0];
        assert!(DecisionTree::new_classifier().fit(&x, &y).is_err());
    }

    #[test]
    fn test_regressor_simple() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = DecisionTree::new_regressor();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        let mse: f64 = predictions.iter().zip(y.iter()).map(|(p, a)| (p - a).powi(2)).sum::<f64>() / 5.0;
        assert!(mse < 1e-9, "MSE too high: {}", mse);
    }

    #[test]
    fn test_max_depth() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new_classifier().with_max_depth(1);
        tree.fit(&x, &y).unwrap();
        assert!(tree.get_depth() <= 2);
    }

    #[test]
    fn test_feature_importances_favor_informative_feature() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_predict_checks_width() {
        let x = array![[0.0, 1.0], [1.0, 0.0]];
        let y = array![0.0, 1.0];
        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();
        assert!(tree.predict(&array![[0.0]]).is_err());
    }
}

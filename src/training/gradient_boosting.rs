//! Gradient boosting for binary classification
//!
//! Log-loss boosting: each round fits a shallow regression tree to the
//! residuals `y - p` and adds it, shrunk by the learning rate, to the
//! running log-odds.

use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::decision_tree::DecisionTree;
use crate::error::{Result, ScreenerError};

/// Smallest base rate used for the initial log-odds
const MIN_BASE_RATE: f64 = 1e-6;

/// Gradient boosting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Row subsample ratio for each tree
    pub subsample: f64,
    /// Column subsample ratio for each tree
    pub colsample_bytree: f64,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: Some(42),
        }
    }
}

/// Gradient boosting classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    config: GradientBoostingConfig,
    trees: Vec<DecisionTree>,
    col_indices_per_tree: Vec<Vec<usize>>,
    initial_log_odds: f64,
    n_features: usize,
    feature_importances: Vec<f64>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl GradientBoostingClassifier {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            initial_log_odds: 0.0,
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &GradientBoostingConfig {
        &self.config
    }

    /// Fit on 0/1 labels
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
                "cannot fit gradient boosting on zero samples".to_string(),
            ));
        }
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(ScreenerError::ValidationError(
                "gradient boosting classifier expects 0/1 labels".to_string(),
            ));
        }

        let p = y.mean().unwrap_or(0.5).clamp(MIN_BASE_RATE, 1.0 - MIN_BASE_RATE);
        self.initial_log_odds = (p / (1.0 - p)).ln();
        self.n_features = n_features;
        self.trees.clear();
        self.col_indices_per_tree.clear();
        self.feature_importances = vec![0.0; n_features];

        let mut log_odds = Array1::from_elem(n_samples, self.initial_log_odds);
        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        for _ in 0..self.config.n_estimators {
            let residuals: Array1<f64> = y
                .iter()
                .zip(log_odds.iter())
                .map(|(&yi, &lo)| yi - sigmoid(lo))
                .collect();

            let rows = self.subsample_indices(n_samples, &mut rng);
            let cols = self.colsample_indices(n_features, &mut rng);

            let x_cols = x.select(Axis(1), &cols);
            let x_fit = x_cols.select(Axis(0), &rows);
            let y_fit: Array1<f64> = rows.iter().map(|&i| residuals[i]).collect();

            let mut tree = DecisionTree::new_regressor()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_fit, &y_fit)?;

            let step = tree.predict_values(&x_cols)?;
            log_odds.scaled_add(self.config.learning_rate, &step);

            if let Some(importances) = tree.feature_importances() {
                for (&col, &imp) in cols.iter().zip(importances.iter()) {
                    self.feature_importances[col] += imp;
                }
            }

            self.trees.push(tree);
            self.col_indices_per_tree.push(cols);
        }

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= total;
            }
        }

        Ok(self)
    }

    fn subsample_indices(&self, n_samples: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        if self.config.subsample >= 1.0 {
            return (0..n_samples).collect();
        }
        let n = ((n_samples as f64 * self.config.subsample).ceil() as usize).clamp(1, n_samples);
        let mut indices = rand::seq::index::sample(rng, n_samples, n).into_vec();
        indices.sort_unstable();
        indices
    }

    fn colsample_indices(&self, n_features: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        if self.config.colsample_bytree >= 1.0 {
            return (0..n_features).collect();
        }
        let n = ((n_features as f64 * self.config.colsample_bytree).ceil() as usize)
            .clamp(1, n_features.max(1));
        let mut indices = rand::seq::index::sample(rng, n_features, n).into_vec();
        indices.sort_unstable();
        indices
    }

    /// Positive-class probability
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScreenerError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(ScreenerError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let steps: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .zip(self.col_indices_per_tree.par_iter())
            .map(|(tree, cols)| tree.predict_values(&x.select(Axis(1), cols)))
            .collect::<Result<Vec<_>>>()?;

        let mut log_odds = Array1::from_elem(x.nrows(), self.initial_log_odds);
        for step in &steps {
            log_odds.scaled_add(self.config.learning_rate, step);
        }
        Ok(log_odds.mapv(sigmoid))
    }

    /// Class labels (1 when the positive probability exceeds one half)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .predict_proba(x)?
            .mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

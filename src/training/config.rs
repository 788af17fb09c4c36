//! Training configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScreenerError};

use super::cross_validation::CVStrategy;
use super::gradient_boosting::GradientBoostingConfig;
use super::random_forest::MaxFeatures;

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth of trees (None = grow until pure)
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered at each split
    pub max_features: MaxFeatures,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

/// Configuration for the classifier bank training pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fold strategy used for scoring
    pub cv_strategy: CVStrategy,

    /// Random seed for fold shuffling and every classifier
    pub random_seed: u64,

    pub forest: ForestConfig,

    pub boosting: GradientBoostingConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            cv_strategy: CVStrategy::StratifiedKFold {
                n_splits: 5,
                shuffle: true,
            },
            random_seed: 42,
            forest: ForestConfig::default(),
            boosting: GradientBoostingConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set number of folds, keeping the strategy kind
    pub fn with_cv(mut self, folds: usize) -> Self {
        self.cv_strategy = match self.cv_strategy {
            CVStrategy::KFold { shuffle, .. } => CVStrategy::KFold { n_splits: folds, shuffle },
            CVStrategy::StratifiedKFold { shuffle, .. } => {
                CVStrategy::StratifiedKFold { n_splits: folds, shuffle }
            }
        };
        self
    }

    /// Builder method to set the fold strategy
    pub fn with_cv_strategy(mut self, strategy: CVStrategy) -> Self {
        self.cv_strategy = strategy;
        self
    }

    /// Builder method to set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self.boosting.random_state = Some(seed);
        self
    }

    /// Builder method to set number of estimators for both ensembles
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.forest.n_estimators = n;
        self.boosting.n_estimators = n;
        self
    }

    /// Builder method to cap forest tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.forest.max_depth = Some(depth);
        self
    }

    /// Builder method to set the boosting learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.boosting.learning_rate = lr;
        self
    }

    pub fn n_splits(&self) -> usize {
        match self.cv_strategy {
            CVStrategy::KFold { n_splits, .. } | CVStrategy::StratifiedKFold { n_splits, .. } => {
                n_splits
            }
        }
    }

    /// Reject settings that cannot produce a fitted ensemble
    pub fn validate(&self) -> Result<()> {
        if self.forest.n_estimators == 0 || self.boosting.n_estimators == 0 {
            return Err(ScreenerError::ValidationError(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if !(self.boosting.learning_rate > 0.0) {
            return Err(ScreenerError::ValidationError(format!(
                "learning_rate must be positive, got {}",
                self.boosting.learning_rate
            )));
        }
        if self.n_splits() < 2 {
            return Err(ScreenerError::ValidationError(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.n_splits()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.n_splits(), 5);
        assert_eq!(config.random_seed, 42);
        assert!(matches!(
            config.cv_strategy,
            CVStrategy::StratifiedKFold { shuffle: true, .. }
        ));
    }

    #[test]
    fn test_builder_pattern() {
        let config = TrainingConfig::new()
            .with_n_estimators(20)
            .with_max_depth(6)
            .with_random_state(7)
            .with_cv(3);

        assert_eq!(config.forest.n_estimators, 20);
        assert_eq!(config.boosting.n_estimators, 20);
        assert_eq!(config.forest.max_depth, Some(6));
        assert_eq!(config.boosting.random_state, Some(7));
        assert_eq!(config.n_splits(), 3);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = TrainingConfig::new().with_learning_rate(0.05);
        let json = serde_json::to_string(&config).unwrap();
        let back: TrainingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validate_rejects_degenerate_settings() {
        assert!(TrainingConfig::new().validate().is_ok());
        assert!(matches!(
            TrainingConfig::new().with_n_estimators(0).validate(),
            Err(ScreenerError::ValidationError(_))
        ));
        assert!(TrainingConfig::new().with_learning_rate(0.0).validate().is_err());
        assert!(TrainingConfig::new().with_cv(1).validate().is_err());
    }
}

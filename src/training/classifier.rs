//! Trained binary classifier variants

use crate::error::Result;
use crate::schema::ClassifierKind;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::config::TrainingConfig;
use super::gradient_boosting::GradientBoostingClassifier;
use super::random_forest::RandomForest;

/// A 0/1 classifier of one of the supported ensemble kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BinaryClassifier {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoostingClassifier),
}

impl BinaryClassifier {
    /// Unfitted classifier of `kind`, configured from `config`
    pub fn new(kind: ClassifierKind, config: &TrainingConfig) -> Self {
        match kind {
            ClassifierKind::RandomForest => {
                let forest = &config.forest;
                let mut rf = RandomForest::new(forest.n_estimators)
                    .with_min_samples_split(forest.min_samples_split)
                    .with_min_samples_leaf(forest.min_samples_leaf)
                    .with_max_features(forest.max_features)
                    .with_random_state(config.random_seed);
                if let Some(depth) = forest.max_depth {
                    rf = rf.with_max_depth(depth);
                }
                BinaryClassifier::RandomForest(rf)
            }
            ClassifierKind::GradientBoosting => {
                let mut boosting = config.boosting.clone();
                boosting.random_state = Some(config.random_seed);
                BinaryClassifier::GradientBoosting(GradientBoostingClassifier::new(boosting))
            }
        }
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            BinaryClassifier::RandomForest(_) => ClassifierKind::RandomForest,
            BinaryClassifier::GradientBoosting(_) => ClassifierKind::GradientBoosting,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            BinaryClassifier::RandomForest(m) => {
                m.fit(x, y)?;
            }
            BinaryClassifier::GradientBoosting(m) => {
                m.fit(x, y)?;
            }
        }
        Ok(())
    }

    /// Predicted labels, 0.0 or 1.0
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            BinaryClassifier::RandomForest(m) => m.predict(x),
            BinaryClassifier::GradientBoosting(m) => m.predict(x),
        }
    }

    /// Positive-class probability per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            BinaryClassifier::RandomForest(m) => m.predict_proba(x),
            BinaryClassifier::GradientBoosting(m) => m.predict_proba(x),
        }
    }

    /// Number of features the classifier was fit on
    pub fn n_features(&self) -> usize {
        match self {
            BinaryClassifier::RandomForest(m) => m.n_features(),
            BinaryClassifier::GradientBoosting(m) => m.n_features(),
        }
    }

    pub fn feature_importances(&self) -> Vec<f64> {
        match self {
            BinaryClassifier::RandomForest(m) => m
                .feature_importances()
                .map(|imp| imp.to_vec())
                .unwrap_or_default(),
            BinaryClassifier::GradientBoosting(m) => m.feature_importances().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_follows_kind() {
        let config = TrainingConfig::new().with_n_estimators(3);
        let rf = BinaryClassifier::new(ClassifierKind::RandomForest, &config);
        let gb = BinaryClassifier::new(ClassifierKind::GradientBoosting, &config);
        assert_eq!(rf.kind(), ClassifierKind::RandomForest);
        assert_eq!(gb.kind(), ClassifierKind::GradientBoosting);
    }

    #[test]
    fn test_fit_predict_both_kinds() {
        let x = array![[0.0], [1.0], [2.0], [10.0], [11.0], [12.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let config = TrainingConfig::new().with_n_estimators(25).with_learning_rate(0.5);

        for kind in [ClassifierKind::RandomForest, ClassifierKind::GradientBoosting] {
            let mut model = BinaryClassifier::new(kind, &config);
            model.fit(&x, &y).unwrap();
            assert_eq!(model.n_features(), 1);
            assert_eq!(model.predict(&x).unwrap(), y);
            assert_eq!(model.feature_importances().len(), 1);
        }
    }
}

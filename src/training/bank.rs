//! Per-target binary classifier bank
//!
//! Trains one classifier per outcome target (outcome vs. everything else)
//! plus the deployment "success" classifier. Every classifier is scored with
//! the configured cross-validation first and then refit on the full data.

use crate::error::{Result, ScreenerError};
use crate::preprocessing::{AssembledFeatures, LabelEncoder};
use crate::schema::{ClassifierKind, OutcomeTarget, OUTCOME_COLUMN, SUCCESS_KEY};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use super::classifier::BinaryClassifier;
use super::config::TrainingConfig;
use super::cross_validation::{CVResults, CrossValidator};
use super::metrics::ConfusionCounts;

/// Cross-validated scores of one classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetResult {
    pub classifier: ClassifierKind,
    /// Rows labelled 1 for this target
    pub positives: usize,
    pub mean_precision: f64,
    pub std_precision: f64,
    pub mean_recall: f64,
    pub std_recall: f64,
    pub fold_precision: Vec<f64>,
    pub fold_recall: Vec<f64>,
    /// Importance per contract column of the refit classifier
    pub feature_importances: BTreeMap<String, f64>,
}

/// Everything the training pass reports, persisted as `model_results.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub n_samples: usize,
    pub n_features: usize,
    pub config: TrainingConfig,
    /// Scores keyed by classifier key, e.g. `AC_vs_Other_GB`
    pub results: BTreeMap<String, TargetResult>,
    /// Per classifier key: row index of each held-out true positive and its
    /// positive-class probability
    pub positive_predictions: BTreeMap<String, BTreeMap<usize, f64>>,
}

impl TrainingReport {
    /// Ranked summary lines, best mean precision first
    pub fn summary(&self) -> Vec<(String, &TargetResult)> {
        let mut rows: Vec<(String, &TargetResult)> =
            self.results.iter().map(|(k, v)| (k.clone(), v)).collect();
        rows.sort_by(|a, b| {
            b.1.mean_precision
                .partial_cmp(&a.1.mean_precision)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }
}

/// The five per-target classifiers, refit on the full data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetModels {
    models: BTreeMap<OutcomeTarget, BinaryClassifier>,
}

impl TargetModels {
    pub fn get(&self, target: OutcomeTarget) -> Option<&BinaryClassifier> {
        self.models.get(&target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutcomeTarget, &BinaryClassifier)> {
        self.models.iter().map(|(t, m)| (*t, m))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Output of [`ClassifierBank::train`]
#[derive(Debug, Clone)]
pub struct TrainedBank {
    pub success: BinaryClassifier,
    pub targets: TargetModels,
    pub target_encoder: LabelEncoder,
    pub report: TrainingReport,
}

/// Trains and scores every classifier of the bank
#[derive(Debug, Clone, Default)]
pub struct ClassifierBank {
    config: TrainingConfig,
}

impl ClassifierBank {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train all targets on an assembled feature matrix
    pub fn train(&self, features: &AssembledFeatures) -> Result<TrainedBank> {
        self.config.validate()?;
        let start = Instant::now();
        let x = &features.x;
        let (target_encoder, encoded) =
            LabelEncoder::fit_transform(OUTCOME_COLUMN, features.outcomes.as_slice());

        info!(
            rows = x.nrows(),
            features = x.ncols(),
            outcomes = ?target_encoder.classes(),
            "Training classifier bank"
        );

        let mut results = BTreeMap::new();
        let mut positive_predictions = BTreeMap::new();
        let mut models = BTreeMap::new();

        for target in OutcomeTarget::ALL {
            let codes: Vec<usize> = target
                .codes()
                .iter()
                .filter_map(|code| target_encoder.code_of(code))
                .collect();
            if codes.is_empty() {
                return Err(ScreenerError::TrainingError(format!(
                    "outcome code {} not present in training data",
                    target.codes().join("/")
                )));
            }
            let y: Array1<f64> = encoded
                .iter()
                .map(|c| if codes.contains(c) { 1.0 } else { 0.0 })
                .collect();

            let key = target.key();
            let (result, positives, model) =
                self.evaluate(&key, target.classifier_kind(), x, &y, features.contract.columns())?;
            results.insert(key.clone(), result);
            positive_predictions.insert(key, positives);
            models.insert(target, model);
        }

        let y_success: Array1<f64> = features
            .outcomes
            .iter()
            .map(|o| match OutcomeTarget::from_code(o) {
                Some(t) if t.is_success() => 1.0,
                _ => 0.0,
            })
            .collect();
        let (result, positives, success) = self.evaluate(
            SUCCESS_KEY,
            ClassifierKind::RandomForest,
            x,
            &y_success,
            features.contract.columns(),
        )?;
        results.insert(SUCCESS_KEY.to_string(), result);
        positive_predictions.insert(SUCCESS_KEY.to_string(), positives);

        info!(
            classifiers = results.len(),
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Classifier bank trained"
        );

        Ok(TrainedBank {
            success,
            targets: TargetModels { models },
            target_encoder,
            report: TrainingReport {
                trained_at: Utc::now(),
                n_samples: x.nrows(),
                n_features: x.ncols(),
                config: self.config.clone(),
                results,
                positive_predictions,
            },
        })
    }

    /// Cross-validate one classifier, then refit it on everything
    fn evaluate(
        &self,
        key: &str,
        kind: ClassifierKind,
        x: &Array2<f64>,
        y: &Array1<f64>,
        columns: &[String],
    ) -> Result<(TargetResult, BTreeMap<usize, f64>, BinaryClassifier)> {
        let splits = CrossValidator::new(self.config.cv_strategy.clone())
            .with_random_state(self.config.random_seed)
            .split(x.nrows(), Some(y))?;

        let mut precision = Vec::with_capacity(splits.len());
        let mut recall = Vec::with_capacity(splits.len());
        let mut true_positives = BTreeMap::new();

        for split in &splits {
            let x_train = x.select(Axis(0), &split.train_indices);
            let y_train: Array1<f64> = split.train_indices.iter().map(|&i| y[i]).collect();
            let x_test = x.select(Axis(0), &split.test_indices);
            let y_test: Array1<f64> = split.test_indices.iter().map(|&i| y[i]).collect();

            let mut model = BinaryClassifier::new(kind, &self.config);
            model.fit(&x_train, &y_train)?;
            let y_pred = model.predict(&x_test)?;
            let y_proba = model.predict_proba(&x_test)?;

            let counts = ConfusionCounts::compute(&y_test, &y_pred);
            precision.push(counts.precision());
            recall.push(counts.recall());

            for (i, &row) in split.test_indices.iter().enumerate() {
                if y_pred[i] == 1.0 && y_test[i] == 1.0 {
                    true_positives.insert(row, y_proba[i]);
                }
            }

            debug!(
                model = key,
                fold = split.fold_idx,
                precision = counts.precision(),
                recall = counts.recall(),
                "Fold scored"
            );
        }

        let precision = CVResults::from_scores(precision);
        let recall = CVResults::from_scores(recall);

        let mut model = BinaryClassifier::new(kind, &self.config);
        model.fit(x, y)?;

        let feature_importances = columns
            .iter()
            .cloned()
            .zip(model.feature_importances())
            .collect();

        info!(
            model = key,
            mean_precision = precision.mean_score,
            std_precision = precision.std_score,
            mean_recall = recall.mean_score,
            std_recall = recall.std_score,
            "Cross-validated"
        );

        let result = TargetResult {
            classifier: kind,
            positives: y.iter().filter(|&&v| v == 1.0).count(),
            mean_precision: precision.mean_score,
            std_precision: precision.std_score,
            mean_recall: recall.mean_score,
            std_recall: recall.std_score,
            fold_precision: precision.scores,
            fold_recall: recall.scores,
            feature_importances,
        };
        Ok((result, true_positives, model))
    }
}

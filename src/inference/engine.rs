//! Prediction engine over loaded artifacts

use crate::error::{Result, ScreenerError};
use crate::export::ModelBundle;
use crate::preprocessing::{ColumnContract, LabelEncoder, SharedEncoders};
use crate::schema::{OutcomeTarget, FAILURE_LABEL, SUCCESS_LABEL};
use crate::training::{BinaryClassifier, TargetModels};
use ndarray::Array2;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::request::{form_columns, CompanyForm, CompanyRecord};

/// Result of the deployment classifier for one company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Human-readable label
    pub label: &'static str,
    /// 1 for success, 0 otherwise
    pub prediction: u8,
    pub positive_probability: f64,
    /// Confidence in the predicted label, 0..=100
    pub confidence: f64,
}

impl Prediction {
    /// Confidence with two decimals, as reported over HTTP
    pub fn confidence_text(&self) -> String {
        format!("{:.2}", self.confidence)
    }
}

/// Confidence in `prediction` given the positive-class probability
pub fn confidence(prediction: u8, positive_probability: f64) -> f64 {
    let pct = positive_probability * 100.0;
    if prediction == 0 {
        100.0 - pct
    } else {
        pct
    }
}

/// Result of one per-target classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeResult {
    pub target: OutcomeTarget,
    /// Classifier key, e.g. `AC_vs_Other_GB`
    pub key: String,
    /// Outcome code as spelled in the training data
    pub outcome: String,
    pub prediction: u8,
    pub probability: f64,
}

/// Encodes forms and runs the loaded classifiers
#[derive(Debug)]
pub struct Predictor {
    contract: ColumnContract,
    encoders: SharedEncoders,
    target_encoder: LabelEncoder,
    success: BinaryClassifier,
    targets: TargetModels,
}

impl Predictor {
    pub fn new(bundle: ModelBundle) -> Self {
        let provided = form_columns();
        let unfilled = bundle.contract.missing_from(&provided);
        if !unfilled.is_empty() {
            warn!(
                columns = ?unfilled,
                "Model columns the form cannot supply will be predicted as 0"
            );
        }

        Self {
            contract: bundle.contract,
            encoders: SharedEncoders::new(bundle.encoders),
            target_encoder: bundle.target_encoder,
            success: bundle.success,
            targets: bundle.targets,
        }
    }

    pub fn contract(&self) -> &ColumnContract {
        &self.contract
    }

    pub fn encoders(&self) -> &SharedEncoders {
        &self.encoders
    }

    /// Encode a parsed form into a single row in contract order
    pub fn encode(&self, record: &CompanyRecord) -> Result<Array2<f64>> {
        let mut values: HashMap<String, f64> = record
            .numeric
            .iter()
            .map(|(column, value)| (column.to_string(), *value))
            .collect();

        for (column, value) in &record.categorical {
            if !self.encoders.has_column(column) {
                debug!(column, "No encoder for categorical column, skipping");
                continue;
            }
            let code = self.encoders.encode_or_extend(column, value)?;
            values.insert(column.to_string(), code as f64);
        }

        Ok(self.contract.reindex_row(&values))
    }

    fn run(model: &BinaryClassifier, row: &Array2<f64>) -> Result<(u8, f64)> {
        let failed = |e: ScreenerError| ScreenerError::InferenceError(e.to_string());
        let label = model.predict(row).map_err(failed)?;
        let proba = model.predict_proba(row).map_err(failed)?;
        match (label.get(0), proba.get(0)) {
            (Some(&l), Some(&p)) => Ok((if l > 0.5 { 1 } else { 0 }, p)),
            _ => Err(ScreenerError::InferenceError(
                "classifier returned no prediction".to_string(),
            )),
        }
    }

    /// Success vs. closed/no event for one company
    pub fn predict(&self, form: &CompanyForm) -> Result<Prediction> {
        let record = form.parse()?;
        let row = self.encode(&record)?;
        let (prediction, positive_probability) = Self::run(&self.success, &row)?;

        let result = Prediction {
            label: if prediction == 1 { SUCCESS_LABEL } else { FAILURE_LABEL },
            prediction,
            positive_probability,
            confidence: confidence(prediction, positive_probability),
        };
        debug!(
            label = result.label,
            probability = positive_probability,
            "Prediction"
        );
        Ok(result)
    }

    /// Every per-target classifier for one company
    pub fn predict_outcomes(&self, form: &CompanyForm) -> Result<Vec<OutcomeResult>> {
        let record = form.parse()?;
        let row = self.encode(&record)?;

        self.targets
            .iter()
            .map(|(target, model)| {
                let (prediction, probability) = Self::run(model, &row)?;
                Ok(OutcomeResult {
                    target,
                    key: target.key(),
                    outcome: self.outcome_code(target)?,
                    prediction,
                    probability,
                })
            })
            .collect()
    }

    /// Decode the target's outcome code through the target encoder
    fn outcome_code(&self, target: OutcomeTarget) -> Result<String> {
        let code = target
            .codes()
            .iter()
            .find_map(|c| self.target_encoder.code_of(c))
            .ok_or_else(|| {
                ScreenerError::InferenceError(format!(
                    "target encoder has no code for {}",
                    target.label_name()
                ))
            })?;
        Ok(self.target_encoder.inverse_transform(code)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_complement_for_negative() {
        assert!((confidence(1, 0.85) - 85.0).abs() < 1e-9);
        assert!((confidence(0, 0.2) - 80.0).abs() < 1e-9);
        for p in [0.0, 0.3, 0.5, 1.0] {
            for label in [0, 1] {
                let c = confidence(label, p);
                assert!((0.0..=100.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_confidence_text_two_decimals() {
        let prediction = Prediction {
            label: FAILURE_LABEL,
            prediction: 0,
            positive_probability: 0.123,
            confidence: confidence(0, 0.123),
        };
        assert_eq!(prediction.confidence_text(), "87.70");
    }
}

//! On-disk artifact store for a trained classifier bank

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

use super::versioning::{ArtifactEnvelope, ArtifactKind};
use crate::error::{Result, ScreenerError};
use crate::preprocessing::{AssembledFeatures, CategoricalEncoders, ColumnContract, LabelEncoder};
use crate::training::{BinaryClassifier, TargetModels, TrainedBank, TrainingReport};

pub const SUCCESS_MODEL_FILE: &str = "final_model.bin";
pub const TARGET_MODELS_FILE: &str = "final_models.bin";
pub const ENCODERS_FILE: &str = "label_encoders.bin";
pub const TARGET_ENCODER_FILE: &str = "target_encoder.bin";
pub const CONTRACT_FILE: &str = "column_names.bin";
pub const REPORT_FILE: &str = "model_results.json";

/// Files that must all exist before the prediction service can start
pub const REQUIRED_ARTIFACTS: &[&str] = &[
    SUCCESS_MODEL_FILE,
    TARGET_MODELS_FILE,
    ENCODERS_FILE,
    TARGET_ENCODER_FILE,
    CONTRACT_FILE,
];

/// Everything the prediction service needs
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub contract: ColumnContract,
    pub encoders: CategoricalEncoders,
    pub target_encoder: LabelEncoder,
    pub success: BinaryClassifier,
    pub targets: TargetModels,
}

impl ModelBundle {
    /// Combine the training inputs with the trained bank
    pub fn from_training(features: &AssembledFeatures, bank: TrainedBank) -> (Self, TrainingReport) {
        let bundle = Self {
            contract: features.contract.clone(),
            encoders: features.encoders.clone(),
            target_encoder: bank.target_encoder,
            success: bank.success,
            targets: bank.targets,
        };
        (bundle, bank.report)
    }
}

/// Directory of persisted artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Required artifacts that are not on disk
    pub fn missing(&self) -> Vec<String> {
        REQUIRED_ARTIFACTS
            .iter()
            .filter(|file| !self.path(file).is_file())
            .map(|file| file.to_string())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Write every artifact of a bundle plus the training report
    pub fn save(&self, bundle: &ModelBundle, report: &TrainingReport) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let fingerprint = bundle.contract.fingerprint();

        ArtifactEnvelope::new(ArtifactKind::ColumnContract, fingerprint.as_str(), &bundle.contract)
            .write(&self.path(CONTRACT_FILE))?;
        ArtifactEnvelope::new(ArtifactKind::CategoricalEncoders, fingerprint.as_str(), &bundle.encoders)
            .write(&self.path(ENCODERS_FILE))?;
        ArtifactEnvelope::new(ArtifactKind::TargetEncoder, fingerprint.as_str(), &bundle.target_encoder)
            .write(&self.path(TARGET_ENCODER_FILE))?;
        ArtifactEnvelope::new(ArtifactKind::SuccessModel, fingerprint.as_str(), &bundle.success)
            .write(&self.path(SUCCESS_MODEL_FILE))?;
        ArtifactEnvelope::new(ArtifactKind::TargetModels, fingerprint.as_str(), &bundle.targets)
            .write(&self.path(TARGET_MODELS_FILE))?;
        self.save_report(report)?;

        info!(
            dir = %self.root.display(),
            contract = %fingerprint,
            features = bundle.contract.len(),
            "Saved artifacts"
        );
        Ok(())
    }

    pub fn save_report(&self, report: &TrainingReport) -> Result<()> {
        let file = File::create(self.path(REPORT_FILE))?;
        serde_json::to_writer_pretty(BufWriter::new(file), report)?;
        Ok(())
    }

    /// Load and cross-check every required artifact
    pub fn load(&self) -> Result<ModelBundle> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ScreenerError::ArtifactMissing(missing));
        }

        let contract_env: ArtifactEnvelope<ColumnContract> =
            ArtifactEnvelope::read(&self.path(CONTRACT_FILE), ArtifactKind::ColumnContract)?;
        let contract = contract_env.payload;
        let fingerprint = contract.fingerprint();
        if contract_env.contract_fingerprint != fingerprint {
            return Err(ScreenerError::ArtifactError(format!(
                "{} is corrupt: stored fingerprint {} does not match its columns ({})",
                CONTRACT_FILE, contract_env.contract_fingerprint, fingerprint
            )));
        }

        let encoders: CategoricalEncoders =
            ArtifactEnvelope::read(&self.path(ENCODERS_FILE), ArtifactKind::CategoricalEncoders)?
                .expect_fingerprint(&fingerprint)?
                .payload;
        let target_encoder: LabelEncoder =
            ArtifactEnvelope::read(&self.path(TARGET_ENCODER_FILE), ArtifactKind::TargetEncoder)?
                .expect_fingerprint(&fingerprint)?
                .payload;
        let success: BinaryClassifier =
            ArtifactEnvelope::read(&self.path(SUCCESS_MODEL_FILE), ArtifactKind::SuccessModel)?
                .expect_fingerprint(&fingerprint)?
                .payload;
        let targets: TargetModels =
            ArtifactEnvelope::read(&self.path(TARGET_MODELS_FILE), ArtifactKind::TargetModels)?
                .expect_fingerprint(&fingerprint)?
                .payload;

        let classifiers = std::iter::once(&success).chain(targets.iter().map(|(_, m)| m));
        for model in classifiers {
            if model.n_features() != contract.len() {
                return Err(ScreenerError::ArtifactError(format!(
                    "classifier expects {} features but the column contract has {}",
                    model.n_features(),
                    contract.len()
                )));
            }
        }

        info!(
            dir = %self.root.display(),
            contract = %fingerprint,
            features = contract.len(),
            targets = targets.len(),
            "Loaded artifacts"
        );

        Ok(ModelBundle {
            contract,
            encoders,
            target_encoder,
            success,
            targets,
        })
    }

    /// Read `model_results.json`
    pub fn load_report(&self) -> Result<TrainingReport> {
        let path = self.path(REPORT_FILE);
        let file = File::open(&path).map_err(|e| {
            ScreenerError::ArtifactError(format!("failed to open {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::FeatureAssembler;
    use crate::training::{ClassifierBank, TrainingConfig};
    use polars::prelude::*;

    fn trained() -> (ModelBundle, TrainingReport) {
        let n = 40;
        let outcomes = ["IP", "FR", "NE", "AC", "CL"];
        let df = df!(
            "country_code" => (0..n).map(|i| if i % 3 == 0 { "USA" } else { "DEU" }).collect::<Vec<_>>(),
            "num_funding_rounds" => (0..n).map(|i| (i % 5) as i64).collect::<Vec<_>>(),
            "outcome" => (0..n).map(|i| outcomes[i % 5]).collect::<Vec<_>>()
        )
        .unwrap();
        let features = FeatureAssembler::new().assemble(&df).unwrap();
        let bank = ClassifierBank::new(TrainingConfig::new().with_n_estimators(3))
            .train(&features)
            .unwrap();
        ModelBundle::from_training(&features, bank)
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.missing().len(), REQUIRED_ARTIFACTS.len());

        let (bundle, report) = trained();
        store.save(&bundle, &report).unwrap();
        assert!(store.is_complete());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.contract, bundle.contract);
        assert_eq!(loaded.encoders, bundle.encoders);
        assert_eq!(loaded.targets.len(), 5);

        let report = store.load_report().unwrap();
        assert_eq!(report.results.len(), 6);
    }

    #[test]
    fn test_missing_artifacts_listed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        match store.load() {
            Err(ScreenerError::ArtifactMissing(files)) => {
                assert!(files.contains(&SUCCESS_MODEL_FILE.to_string()));
                assert!(files.contains(&CONTRACT_FILE.to_string()));
            }
            other => panic!("expected ArtifactMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_contract_mismatch_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (bundle, report) = trained();
        store.save(&bundle, &report).unwrap();

        let other = ColumnContract::new(vec!["num_funding_rounds".into(), "country_code".into()]);
        ArtifactEnvelope::new(ArtifactKind::ColumnContract, other.fingerprint(), &other)
            .write(&store.path(CONTRACT_FILE))
            .unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("column contract"), "{}", err);
    }
}

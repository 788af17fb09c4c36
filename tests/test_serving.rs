//! Integration test: artifact loading and the prediction service

mod common;

use std::collections::HashMap;

use outcome_screener::error::ScreenerError;
use outcome_screener::export::{ArtifactStore, CONTRACT_FILE, SUCCESS_MODEL_FILE};
use outcome_screener::inference::{CompanyForm, Predictor};
use outcome_screener::server::{AppState, ServerConfig};

fn form(overrides: &[(&str, &str)]) -> CompanyForm {
    let fields: HashMap<String, String> = common::form_body(overrides)
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.replace("%2C", ",").replace('+', " ")))
        .collect();
    CompanyForm::new(fields)
}

fn predictor() -> Predictor {
    Predictor::new(ArtifactStore::new(&common::trained().artifacts_dir).load().unwrap())
}

#[test]
fn test_unseen_category_extends_vocabulary() {
    let predictor = predictor();
    let before = predictor.encoders().vocabulary_len("country_code").unwrap();

    predictor.predict(&form(&[("company_country_code", "XX")])).unwrap();
    assert_eq!(predictor.encoders().vocabulary_len("country_code"), Some(before + 1));

    // seen now, no further growth
    predictor.predict(&form(&[("company_country_code", "XX")])).unwrap();
    assert_eq!(predictor.encoders().vocabulary_len("country_code"), Some(before + 1));
}

#[test]
fn test_confidence_matches_probability() {
    let prediction = predictor().predict(&form(&[])).unwrap();
    let pct = prediction.positive_probability * 100.0;
    let expected = if prediction.prediction == 1 { pct } else { 100.0 - pct };
    assert!((prediction.confidence - expected).abs() < 1e-9);
}

#[test]
fn test_encoded_row_follows_contract() {
    let predictor = predictor();
    let record = form(&[]).parse().unwrap();
    let row = predictor.encode(&record).unwrap();
    assert_eq!(row.shape(), &[1, predictor.contract().len()]);

    let position = predictor.contract().position("num_funding_rounds").unwrap();
    assert_eq!(row[[0, position]], 3.0);
}

#[test]
fn test_missing_artifacts_refuse_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_path: dir.path().join("missing.csv"),
        artifacts_dir: dir.path().to_path_buf(),
    };
    match AppState::load(config) {
        Err(ScreenerError::ArtifactMissing(files)) => {
            assert!(files.contains(&SUCCESS_MODEL_FILE.to_string()));
            assert_eq!(files.len(), 5);
        }
        Err(other) => panic!("expected ArtifactMissing, got {}", other),
        Ok(_) => panic!("loaded without artifacts"),
    }
}

#[test]
fn test_missing_dataset_disables_search_only() {
    let trained = common::trained();
    let mut config = trained.server_config();
    config.data_path = trained.artifacts_dir.join("no-such.csv");

    let state = AppState::load(config).unwrap();
    assert!(state.index.is_empty());
    assert!(state.predictor.predict(&form(&[])).is_ok());
}

#[test]
fn test_partial_artifact_directory() {
    let trained = common::trained();
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        trained.artifacts_dir.join(CONTRACT_FILE),
        dir.path().join(CONTRACT_FILE),
    )
    .unwrap();

    let store = ArtifactStore::new(dir.path());
    assert_eq!(store.missing().len(), 4);
    assert!(matches!(store.load(), Err(ScreenerError::ArtifactMissing(_))));
}

//! Integration test: training pass end-to-end

mod common;

use outcome_screener::export::{ArtifactStore, REPORT_FILE, REQUIRED_ARTIFACTS};
use outcome_screener::preprocessing::FeatureAssembler;
use outcome_screener::schema::{OutcomeTarget, SUCCESS_KEY};
use outcome_screener::training::{ClassifierBank, TrainingConfig};
use outcome_screener::utils::DataLoader;
use polars::prelude::*;

#[test]
fn test_training_writes_every_artifact() {
    let trained = common::trained();
    let store = ArtifactStore::new(&trained.artifacts_dir);

    for file in REQUIRED_ARTIFACTS {
        assert!(store.path(file).is_file(), "{} was not written", file);
    }
    assert!(store.path(REPORT_FILE).is_file());

    let bundle = store.load().unwrap();
    assert_eq!(bundle.targets.len(), 5);
    for target in OutcomeTarget::ALL {
        assert!(bundle.targets.get(target).is_some(), "no classifier for {:?}", target);
    }
}

#[test]
fn test_report_has_scores_for_every_target() {
    let trained = common::trained();
    let report = ArtifactStore::new(&trained.artifacts_dir).load_report().unwrap();

    assert_eq!(report.n_samples, 500);
    for target in OutcomeTarget::ALL {
        let result = report
            .results
            .get(&target.key())
            .unwrap_or_else(|| panic!("missing result for {}", target.key()));
        assert_eq!(result.classifier, target.classifier_kind());
        assert_eq!(result.positives, 100);
        assert_eq!(result.fold_precision.len(), 5);
        assert!((0.0..=1.0).contains(&result.mean_precision));
        assert!((0.0..=1.0).contains(&result.mean_recall));
    }
    assert!(report.results.contains_key(SUCCESS_KEY));
    assert!(report.results.contains_key("AC_vs_Other_GB"));
}

#[test]
fn test_report_json_layout() {
    let trained = common::trained();
    let raw = std::fs::read_to_string(trained.artifacts_dir.join(REPORT_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let ipo = &json["results"]["IPO_vs_Other_RF"];
    assert!(ipo["mean_precision"].is_number());
    assert!(ipo["mean_recall"].is_number());
    assert!(json["positive_predictions"].is_object());
}

#[test]
fn test_contract_excludes_administrative_columns() {
    let trained = common::trained();
    let contract = ArtifactStore::new(&trained.artifacts_dir).load().unwrap().contract;

    for column in ["uuid_org", "name_org", "homepage_url", "outcome", "category_groups_list"] {
        assert!(contract.position(column).is_none(), "{} leaked into features", column);
    }
    assert_eq!(contract.position("country_code"), Some(0));
    assert!(contract.position("founders_degree_count_mean").is_none());
}

#[test]
fn test_training_is_deterministic() {
    let trained = common::trained();
    let df = DataLoader::new().load_csv(&trained.data_path).unwrap();
    let features = FeatureAssembler::new().assemble(&df).unwrap();
    let config = TrainingConfig::new().with_n_estimators(5).with_cv(3);

    let a = ClassifierBank::new(config.clone()).train(&features).unwrap();
    let b = ClassifierBank::new(config).train(&features).unwrap();

    let key = OutcomeTarget::FundingRound.key();
    assert_eq!(
        a.report.results[&key].fold_precision,
        b.report.results[&key].fold_precision
    );
    let row = features.x.slice(ndarray::s![0..10, ..]).to_owned();
    assert_eq!(
        a.success.predict_proba(&row).unwrap(),
        b.success.predict_proba(&row).unwrap()
    );
}

#[test]
fn test_missing_outcome_class_fails() {
    let df = df!(
        "country_code" => &["USA", "GBR", "USA", "GBR", "USA", "GBR"],
        "num_funding_rounds" => &[1i64, 2, 3, 4, 5, 6],
        "outcome" => &["FR", "AC", "FR", "AC", "CL", "NE"]
    )
    .unwrap();
    let features = FeatureAssembler::new().assemble(&df).unwrap();
    let result = ClassifierBank::new(TrainingConfig::new().with_n_estimators(2).with_cv(2))
        .train(&features);
    assert!(result.is_err());
}

//! Outcome screener CLI
//!
//! Command-line interface for the training pass, the HTTP service and
//! one-off predictions and searches.

use clap::{Parser, Subcommand};
use colored::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::{ArtifactStore, ModelBundle};
use crate::inference::{CompanyForm, Predictor};
use crate::preprocessing::FeatureAssembler;
use crate::search::CompanyIndex;
use crate::server::{openapi_document, run_server, ServerConfig};
use crate::training::{ClassifierBank, TrainingConfig, TrainingReport};
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

/// Boxed red banner for conditions that stop a command
fn alert(title: &str, lines: &[String]) {
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", title.red().bold()));
    line_box_empty();
    line_box_sep();
    for line in lines {
        line_box(line);
    }
    line_box_bottom();
    println!();
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "screener")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predict startup outcomes from company attributes")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the classifier bank and write the artifacts
    Train {
        /// Company dataset (CSV)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Artifact output directory
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Trees per ensemble
        #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
        n_estimators: u64,

        /// Random seed for splits and ensembles
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of cross-validation folds
        #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(2..))]
        cv_folds: u64,
    },

    /// Start the HTTP service
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Company dataset used for search (and training with --train-if-missing)
        #[arg(short, long)]
        data: Option<PathBuf>,

        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Run the training pass first when no trained model is on disk
        #[arg(long)]
        train_if_missing: bool,
    },

    /// Predict the outcome of one company
    Predict {
        #[arg(short, long)]
        artifacts: Option<PathBuf>,

        /// Form field as company_<column>=<value>; repeatable
        #[arg(short, long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,

        /// Also run every per-outcome classifier
        #[arg(long)]
        outcomes: bool,
    },

    /// Search companies by name
    Search {
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Case-insensitive substring of the company name
        name: String,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the training report of a trained bank
    Info {
        #[arg(short, long)]
        artifacts: Option<PathBuf>,
    },

    /// Write the OpenAPI document
    Openapi {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Training pass ─────────────────────────────────────────────────────────────

/// Load the CSV, train every classifier and persist the artifacts
pub fn run_training(
    data_path: &Path,
    store: &ArtifactStore,
    config: TrainingConfig,
) -> anyhow::Result<TrainingReport> {
    let df = DataLoader::new().load_csv(data_path)?;
    let features = FeatureAssembler::new().assemble(&df)?;
    let bank = ClassifierBank::new(config).train(&features)?;
    let (bundle, report) = ModelBundle::from_training(&features, bank);
    store.save(&bundle, &report)?;
    Ok(report)
}

fn missing_dataset(path: &Path) -> anyhow::Error {
    alert(
        "TRAINING DATA NOT FOUND",
        &[
            kv("Expected", &path.display().to_string()),
            format!("{}", muted("Set DATA_PATH or pass --data")),
        ],
    );
    anyhow::anyhow!("training data not found: {}", path.display())
}

fn print_report(report: &TrainingReport) {
    println!(
        "  {:<22} {:>4} {:>10} {:>10} {:>8}",
        muted("Classifier"),
        muted("Alg"),
        muted("Precision"),
        muted("Recall"),
        muted("Pos")
    );
    println!("  {}", dim(&"─".repeat(58)));
    for (key, result) in report.summary() {
        println!(
            "  {:<22} {:>4} {:>10} {:>10} {:>8}",
            key,
            result.classifier.suffix(),
            format!("{:.3}±{:.2}", result.mean_precision, result.std_precision),
            format!("{:.3}±{:.2}", result.mean_recall, result.std_recall),
            result.positives
        );
    }
    println!();
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &Path,
    artifacts_dir: &Path,
    config: TrainingConfig,
) -> anyhow::Result<()> {
    section("Train");

    if !data_path.is_file() {
        return Err(missing_dataset(data_path));
    }

    step_run(&format!("Training on {}", data_path.display()));
    let start = Instant::now();
    let store = ArtifactStore::new(artifacts_dir);
    let report = run_training(data_path, &store, config)?;
    step_done(&format!(
        "{} rows × {} features in {:.1?}",
        report.n_samples,
        report.n_features,
        start.elapsed()
    ));
    step_ok(&format!("Artifacts written to {}", store.root().display()));
    println!();

    print_report(&report);
    Ok(())
}

pub async fn cmd_serve(config: ServerConfig, train_if_missing: bool) -> anyhow::Result<()> {
    let store = ArtifactStore::new(&config.artifacts_dir);

    if !store.is_complete() && train_if_missing && config.data_path.is_file() {
        section("No trained model found, training first");
        cmd_train(&config.data_path, &config.artifacts_dir, TrainingConfig::new())?;
    }

    let missing = store.missing();
    if !missing.is_empty() {
        let mut lines = vec![kv("Directory", &store.root().display().to_string())];
        lines.extend(missing.iter().map(|f| format!("  {}", f.red())));
        lines.push(format!("{}", muted("Run `screener train` first")));
        alert("MODEL ARTIFACTS MISSING", &lines);
        anyhow::bail!("cannot start: {} artifact(s) missing", missing.len());
    }

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Outcome Screener".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Web UI ", &format!("http://{}:{}", config.host, config.port)));
    line_box(&kv("OpenAPI", &format!("http://{}:{}/openapi.json", config.host, config.port)));
    line_box(&kv("Health ", &format!("http://{}:{}/health", config.host, config.port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}

/// Parse `NAME=VALUE` pairs into a form
fn parse_fields(fields: &[String]) -> anyhow::Result<CompanyForm> {
    let mut form = CompanyForm::new(HashMap::new());
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected NAME=VALUE, got '{}'", field))?;
        form.set(name.trim(), value);
    }
    Ok(form)
}

pub fn cmd_predict(artifacts_dir: &Path, fields: &[String], outcomes: bool) -> anyhow::Result<()> {
    section("Predict");

    let form = parse_fields(fields)?;
    let predictor = Predictor::new(ArtifactStore::new(artifacts_dir).load()?);

    let prediction = predictor.predict(&form)?;
    println!("  {:<16} {}", muted("Prediction"), prediction.label.white().bold());
    println!("  {:<16} {}%", muted("Confidence"), prediction.confidence_text());

    if outcomes {
        println!();
        for result in predictor.predict_outcomes(&form)? {
            println!(
                "  {:<16} {} {}",
                muted(result.target.short_name()),
                if result.prediction == 1 { ok("yes") } else { dim("no") },
                dim(&format!("p={:.3}", result.probability))
            );
        }
    }

    println!();
    Ok(())
}

pub fn cmd_search(data_path: &Path, name: &str, json: bool) -> anyhow::Result<()> {
    let df = DataLoader::new().load_csv(data_path)?;
    let index = CompanyIndex::from_frame(&df)?;
    let hits = index.search(name);

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    section(&format!("Search \"{}\"", name));
    for hit in &hits {
        let company = hit.get("name_org").and_then(|v| v.as_str()).unwrap_or("?");
        let country = hit.get("country_code").and_then(|v| v.as_str()).unwrap_or("");
        let city = hit.get("city").and_then(|v| v.as_str()).unwrap_or("");
        println!("  {:<36} {:<6} {}", company, muted(country), accent(city));
    }
    println!();
    println!("  {} match(es)", hits.len());
    println!();
    Ok(())
}

pub fn cmd_info(artifacts_dir: &Path) -> anyhow::Result<()> {
    section("Model Info");

    let store = ArtifactStore::new(artifacts_dir);
    let report = store.load_report()?;

    println!("  {:<14} {}", muted("Artifacts"), store.root().display());
    println!("  {:<14} {}", muted("Trained at"), report.trained_at.to_rfc3339());
    println!("  {:<14} {}", muted("Rows"), report.n_samples);
    println!("  {:<14} {}", muted("Features"), report.n_features);
    println!("  {:<14} {}", muted("CV folds"), report.config.n_splits());
    let missing = store.missing();
    if missing.is_empty() {
        println!("  {:<14} {}", muted("Status"), ok("complete"));
    } else {
        println!("  {:<14} {} {}", muted("Status"), "missing".red(), missing.join(", "));
    }
    println!();

    print_report(&report);
    Ok(())
}

pub fn cmd_openapi(output: Option<&Path>) -> anyhow::Result<()> {
    let document = serde_json::to_string_pretty(&openapi_document())?;
    match output {
        Some(path) => {
            std::fs::write(path, document)?;
            step_ok(&format!("OpenAPI document written to {}", path.display()));
        }
        None => println!("{}", document),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let form = parse_fields(&["company_city=Berlin".into(), "region = Berlin".into()]).unwrap();
        assert!(form.parse().is_err());
        assert!(parse_fields(&["no_equals_sign".into()]).is_err());
    }

    #[test]
    fn test_train_rejects_zero_estimators() {
        assert!(Cli::try_parse_from(["screener", "train", "--n-estimators", "0"]).is_err());
        assert!(Cli::try_parse_from(["screener", "train", "--cv-folds", "1"]).is_err());
        assert!(Cli::try_parse_from(["screener", "train", "--n-estimators", "3"]).is_ok());
    }

    #[test]
    fn test_strip_ansi() {
        let colored = format!("{}", "hello".red());
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn test_missing_dataset_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_train(&dir.path().join("none.csv"), dir.path(), TrainingConfig::new()).unwrap_err();
        assert!(err.to_string().contains("training data not found"));
    }
}

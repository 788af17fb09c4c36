//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use outcome_screener::cli::run_training;
use outcome_screener::export::ArtifactStore;
use outcome_screener::inference::{FieldType, COMPANY_FIELDS};
use outcome_screener::server::ServerConfig;
use outcome_screener::training::{TrainingConfig, TrainingReport};
use tempfile::TempDir;

pub const OUTCOMES: [&str; 5] = ["IPO", "FR", "NE", "AC", "CL"];
const COUNTRIES: [&str; 4] = ["USA", "GBR", "DEU", "FRA"];
const CITIES: [&str; 4] = ["New York", "London", "Berlin", "Paris"];
const ROUND_TYPES: [&str; 3] = ["seed", "series_a", "series_b"];
const CATEGORIES: [&str; 3] = ["Software", "Biotech", "Fintech"];

/// Company name for row `i`; rows 0, 1, 100, 101, ... contain "acme"
pub fn company_name(i: usize) -> String {
    match i % 100 {
        0 => format!("Acme Robotics {}", i),
        1 => format!("Super ACME {}", i),
        _ => format!("Company {}", i),
    }
}

/// Write an `n`-row company CSV whose features loosely track the outcome
pub fn write_company_csv(path: &Path, n: usize) {
    let mut csv = String::from(
        "uuid_org,name_org,homepage_url,country_code,region,city,category_list,\
         category_groups_list,num_funding_rounds,total_funding_usd,age_months,\
         has_facebook_url,has_twitter_url,has_linkedin_url,round_count,raised_amount_usd,\
         last_round_investment_type,last_round_raised_amount_usd,\
         last_round_post_money_valuation,last_round_timelapse_months,\
         last_round_investor_count,founders_dif_country_count,founders_male_count,\
         founders_female_count,founders_degree_count_total,founders_degree_count_max,\
         founders_degree_count_mean,outcome\n",
    );

    for i in 0..n {
        let o = i % OUTCOMES.len();
        let jitter = (i * 7919) % 13;
        let country = COUNTRIES[(i / 5 + o) % COUNTRIES.len()];
        let city = CITIES[(i / 5 + o) % CITIES.len()];
        let rounds = o + 1 + jitter % 3;
        let funding = (o as f64 + 1.0) * 1_000_000.0 + jitter as f64 * 10_000.0;
        writeln!(
            csv,
            "u{i},{name},https://c{i}.example,{country},{country}-R,{city},{cat},Tech,\
             {rounds},{funding},{age},{fb},{tw},1,{rounds},{raised},{rt},{last},{val},\
             {lapse},{inv},{dif},{male},{female},{deg},{degmax},1.5,{outcome}",
            name = company_name(i),
            cat = CATEGORIES[(i + o) % CATEGORIES.len()],
            age = 12 + o * 20 + jitter,
            fb = i % 2,
            tw = (i + o) % 2,
            raised = funding * 0.8,
            rt = ROUND_TYPES[o % ROUND_TYPES.len()],
            last = funding * 0.3,
            val = funding * 4.0,
            lapse = 3 + o * 4 + jitter % 5,
            inv = 1 + o + jitter % 2,
            dif = jitter % 2,
            male = 1 + o % 3,
            female = (i + o) % 2,
            deg = 2 + o,
            degmax = 1 + o % 2,
            outcome = OUTCOMES[o],
        )
        .unwrap();
    }

    std::fs::write(path, csv).unwrap();
}

/// A dataset and trained artifacts shared by every test in one binary
pub struct Trained {
    _dir: TempDir,
    pub data_path: PathBuf,
    pub artifacts_dir: PathBuf,
    pub report: TrainingReport,
}

impl Trained {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            data_path: self.data_path.clone(),
            artifacts_dir: self.artifacts_dir.clone(),
        }
    }
}

pub fn trained() -> &'static Trained {
    static TRAINED: OnceLock<Trained> = OnceLock::new();
    TRAINED.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("companies.csv");
        let artifacts_dir = dir.path().join("artifacts");
        write_company_csv(&data_path, 500);

        let config = TrainingConfig::new().with_n_estimators(10);
        let report = run_training(&data_path, &ArtifactStore::new(&artifacts_dir), config).unwrap();

        Trained {
            _dir: dir,
            data_path,
            artifacts_dir,
            report,
        }
    })
}

/// A fully populated, URL-encoded prediction form
pub fn form_body(overrides: &[(&str, &str)]) -> String {
    COMPANY_FIELDS
        .iter()
        .map(|field| {
            let name = field.form_name();
            let value = overrides
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| match field.kind {
                    FieldType::Categorical if field.column == "country_code" => "USA".to_string(),
                    FieldType::Categorical if field.column == "last_round_investment_type" => {
                        "series_a".to_string()
                    }
                    FieldType::Categorical => "London".to_string(),
                    FieldType::Integer => "3".to_string(),
                    FieldType::Float => "2,500,000".to_string(),
                });
            format!("{}={}", name, value.replace(',', "%2C").replace(' ', "+"))
        })
        .collect::<Vec<_>>()
        .join("&")
}

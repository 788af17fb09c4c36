//! Application state shared by the request handlers

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::Result;
use crate::export::ArtifactStore;
use crate::inference::Predictor;
use crate::search::CompanyIndex;
use crate::utils::DataLoader;

use super::ServerConfig;

/// Loaded once at start-up; classifiers are read-only afterwards and the
/// encoders inside the predictor guard their own growth.
pub struct AppState {
    pub config: ServerConfig,
    pub predictor: Predictor,
    pub index: CompanyIndex,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, predictor: Predictor, index: CompanyIndex) -> Self {
        Self {
            config,
            predictor,
            index,
            started_at: Utc::now(),
        }
    }

    /// Load the artifacts and the search dataset named by `config`.
    ///
    /// Missing artifacts are an error. A missing dataset only disables search.
    pub fn load(config: ServerConfig) -> Result<Self> {
        let bundle = ArtifactStore::new(&config.artifacts_dir).load()?;
        let predictor = Predictor::new(bundle);

        let index = if config.data_path.is_file() {
            let df = DataLoader::new().load_csv(&config.data_path)?;
            CompanyIndex::from_frame(&df)?
        } else {
            warn!(
                path = %config.data_path.display(),
                "Dataset not found, company search will return no results"
            );
            CompanyIndex::default()
        };

        info!(
            features = predictor.contract().len(),
            companies = index.len(),
            "Application state ready"
        );
        Ok(Self::new(config, predictor, index))
    }
}

//! HTTP service
//!
//! Serves the prediction form, the per-company prediction endpoints and the
//! company search over a dataset loaded once at start-up.

mod api;
mod error;
mod handlers;
pub mod openapi;
mod state;
pub mod templates;

pub use api::create_router;
pub use error::ServerError;
pub use openapi::openapi_document;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use sysinfo::{Pid, System};
use tracing::{info, warn};

/// Default training/search dataset
pub const DEFAULT_DATA_PATH: &str = "./data/csvs/unique_filtered_final_with_target_variable.csv";

/// Default artifact directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "./data/artifacts";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub artifacts_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            data_path: std::env::var("DATA_PATH")
                .unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string())
                .into(),
            artifacts_dir: std::env::var("ARTIFACTS_DIR")
                .unwrap_or_else(|_| DEFAULT_ARTIFACTS_DIR.to_string())
                .into(),
        }
    }
}

fn process_memory_mb() -> Option<u64> {
    let mut system = System::new_all();
    system.refresh_all();
    system
        .process(Pid::from_u32(std::process::id()))
        .map(|p| p.memory() / 1024 / 1024)
}

/// Load artifacts and serve until ctrl+c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        artifacts_dir = %config.artifacts_dir.display(),
        data_path = %config.data_path.display(),
        "Loading artifacts"
    );

    let state = Arc::new(AppState::load(config.clone())?);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        memory_mb = process_memory_mb(),
        started_at = %start_time.to_rfc3339(),
        "Outcome screener starting"
    );
    info!(url = %format!("http://{}", addr), "Web UI available");
    info!(url = %format!("http://{}/openapi.json", addr), "API description available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c, shutting down");
            return;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        if std::env::var("API_PORT").is_err() {
            assert_eq!(config.port, 8080);
        }
        if std::env::var("ARTIFACTS_DIR").is_err() {
            assert_eq!(config.artifacts_dir, PathBuf::from(DEFAULT_ARTIFACTS_DIR));
        }
    }
}

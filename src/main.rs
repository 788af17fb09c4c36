//! Outcome screener - main entry point

use clap::Parser;
use outcome_screener::cli::{
    cmd_info, cmd_openapi, cmd_predict, cmd_search, cmd_serve, cmd_train, Cli, Commands,
};
use outcome_screener::server::ServerConfig;
use outcome_screener::training::TrainingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "outcome_screener=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let defaults = ServerConfig::default();

    match cli.command {
        Some(Commands::Train { data, artifacts, n_estimators, seed, cv_folds }) => {
            let config = TrainingConfig::new()
                .with_cv(cv_folds as usize)
                .with_n_estimators(n_estimators as usize)
                .with_random_state(seed);
            cmd_train(
                &data.unwrap_or(defaults.data_path),
                &artifacts.unwrap_or(defaults.artifacts_dir),
                config,
            )?;
        }
        Some(Commands::Serve { host, port, data, artifacts, train_if_missing }) => {
            let config = ServerConfig {
                host: host.unwrap_or(defaults.host),
                port: port.unwrap_or(defaults.port),
                data_path: data.unwrap_or(defaults.data_path),
                artifacts_dir: artifacts.unwrap_or(defaults.artifacts_dir),
            };
            cmd_serve(config, train_if_missing).await?;
        }
        Some(Commands::Predict { artifacts, fields, outcomes }) => {
            cmd_predict(&artifacts.unwrap_or(defaults.artifacts_dir), &fields, outcomes)?;
        }
        Some(Commands::Search { data, name, json }) => {
            cmd_search(&data.unwrap_or(defaults.data_path), &name, json)?;
        }
        Some(Commands::Info { artifacts }) => {
            cmd_info(&artifacts.unwrap_or(defaults.artifacts_dir))?;
        }
        Some(Commands::Openapi { output }) => {
            cmd_openapi(output.as_deref())?;
        }
        None => {
            // Bare invocation trains when needed, then serves
            cmd_serve(defaults, true).await?;
        }
    }

    Ok(())
}

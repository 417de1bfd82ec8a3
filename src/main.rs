//! Countyscope API Server
//!
//! Run with: cargo run --bin countyscope [config.toml]
//!
//! # Configuration
//!
//! Without a path argument the config is read from the default locations
//! (`~/.config/countyscope/config.toml`, `/etc/countyscope/config.toml`,
//! `./config.toml`). Environment variables override file settings:
//! - `COUNTYSCOPE_INCOME_PATH`, `COUNTYSCOPE_UNEMPLOYMENT_PATH`: statistics CSVs
//! - `COUNTYSCOPE_BOUNDARY_PATH`: shapefile or GeoJSON
//! - `COUNTYSCOPE_STATE_FIPS`: state to keep (default: 27)
//! - `COUNTYSCOPE_API_HOST`, `COUNTYSCOPE_API_PORT`: bind address (default: 0.0.0.0:8085)
//! - `RUST_LOG`: Log filter, overrides `COUNTYSCOPE_LOG_LEVEL`

use countyscope::api::{serve, AppState};
use countyscope::config::Config;
use countyscope::logging;
use countyscope::pipeline::DatasetLoader;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Config::load_with_env(&path)?,
        None => Config::load_default(),
    };

    logging::init(&config.logging)?;

    tracing::info!("Starting Countyscope v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Income table: {}", config.data.income.path);
    tracing::info!("Unemployment table: {}", config.data.unemployment.path);
    tracing::info!("Boundaries: {}", config.data.boundary.path);

    // Load once; every request filters this dataset
    let loader = DatasetLoader::new(config.data.clone());
    let dataset = tokio::task::spawn_blocking(move || loader.load()).await??;

    if dataset.is_empty() {
        tracing::warn!("No counties joined; the readiness probe will fail");
    } else {
        tracing::info!(
            counties = dataset.len(),
            dropped = dataset.report().dropped(),
            "Serving joined counties"
        );
    }

    let state = AppState::new(dataset, config.api.clone(), config.export.clone());
    serve(state, &config.api).await?;

    tracing::info!("Countyscope stopped");
    Ok(())
}

//! Application State
//!
//! Shared state accessible by all API handlers.
//! The dataset is loaded once at startup and never invalidated; handlers only
//! filter it in memory.

use geojson::GeoJson;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiConfig, ExportConfig};
use crate::map::feature_collection;
use crate::pipeline::Dataset;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Joined county data for the lifetime of the process
    pub dataset: Arc<Dataset>,
    /// Sorted county names offered by the multiselects
    pub counties: Arc<Vec<String>>,
    /// Serialized feature collection, rendered once
    pub geojson: Arc<String>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Export naming
    pub export: Arc<ExportConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create the state around a loaded dataset
    pub fn new(dataset: Dataset, config: ApiConfig, export: ExportConfig) -> Self {
        let counties = dataset.counties();
        let geojson = GeoJson::FeatureCollection(feature_collection(&dataset)).to_string();

        Self {
            dataset: Arc::new(dataset),
            counties: Arc::new(counties),
            geojson: Arc::new(geojson),
            config: Arc::new(config),
            export: Arc::new(export),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

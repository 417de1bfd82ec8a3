//! # Countyscope
//!
//! County statistics explorer: joins a median household income table and an
//! unemployment rate table with county boundary polygons, then serves the
//! result as choropleth layers, bar charts and CSV/Excel exports.
//!
//! ## Features
//!
//! - **Tolerant table reading**: Header rows are located by column name, not offset
//! - **Key normalization**: `"Hennepin County"` and `" Hennepin"` join as `Hennepin`
//! - **Boundary sources**: ESRI shapefiles and GeoJSON, reprojected to EPSG:4326
//! - **Join reporting**: Every county dropped by a join is listed and logged
//! - **Exports**: Per-map selections written as CSV or XLSX
//!
//! ## Modules
//!
//! - [`pipeline`]: Reading, normalizing, joining and reprojecting the inputs
//! - [`selection`]: Multiselect state transitions
//! - [`map`]: Choropleth and bar chart payloads
//! - [`export`]: CSV and Excel exports
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use countyscope::config::Config;
//! use countyscope::map::choropleth;
//! use countyscope::pipeline::{DatasetLoader, Metric};
//! use countyscope::selection::Selection;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let dataset = DatasetLoader::new(config.data).load()?;
//!
//!     let everything = Selection::all(&dataset.counties());
//!     let layer = choropleth(&dataset, Metric::MedianIncome, &everything);
//!
//!     println!("{} counties coloured by {}", layer.locations.len(), layer.metric);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod export;
pub mod logging;
pub mod map;
pub mod pipeline;
pub mod selection;

/// Re-export commonly used types at crate root
pub use export::{ExportFormat, ExportKind, ExportTable};
pub use pipeline::{CountyRecord, Dataset, DatasetLoader, JoinReport, Metric, PipelineError};
pub use selection::{DashboardSelection, Selection, SelectionAction};
pub use api::{build_router, serve, ApiError, AppState};
pub use config::{Config, ConfigError, LoggingConfig};

//! County Data Join Pipeline
//!
//! This module turns the raw inputs into a joined, map-ready [`Dataset`]:
//!
//! - **types**: Core data structures (Metric, StatTable, CountyRecord, Dataset)
//! - **normalize**: Canonical county keys and numeric coercion
//! - **stats**: Statistics table reader with header detection
//! - **boundary**: Shapefile and GeoJSON boundary sources
//! - **reproject**: CRS detection and reprojection to EPSG:4326
//! - **join**: Inner joins with drop reporting
//! - **loader**: End-to-end orchestration
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use countyscope::config::DataConfig;
//! use countyscope::pipeline::{DatasetLoader, Metric};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = DatasetLoader::new(DataConfig::default()).load()?;
//!
//!     if let Some((lo, hi)) = dataset.range(Metric::MedianIncome) {
//!         println!("Median income ranges from {} to {}", lo, hi);
//!     }
//!     println!("Dropped {} counties while joining", dataset.report().dropped());
//!
//!     Ok(())
//! }
//! ```

pub mod boundary;
pub mod error;
pub mod join;
pub mod loader;
pub mod normalize;
pub mod reproject;
pub mod stats;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use boundary::{
    open_boundary_source, BoundaryFilter, BoundarySet, BoundarySource, GeoJsonSource,
    ShapefileSource,
};
pub use error::{PipelineError, PipelineResult};
pub use join::{join_boundaries, join_statistics, CombinedStat, JoinReport};
pub use loader::{assemble, DatasetLoader};
pub use normalize::{canonical_county_key, coerce_income, coerce_rate};
pub use reproject::Crs;
pub use stats::StatTableReader;
pub use types::{bounds, BoundaryRow, CountyRecord, Dataset, Metric, StatRow, StatTable};

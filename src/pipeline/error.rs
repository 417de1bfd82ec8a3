//! Pipeline error types
//!
//! Defines all errors that can occur while loading and joining the input data.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the data join pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file could not be opened or read
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited file is malformed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No record in the leading rows carried the expected column names
    #[error("No header with columns {columns:?} in the first {scanned} rows of {path:?}")]
    HeaderNotFound {
        path: PathBuf,
        columns: Vec<String>,
        scanned: usize,
    },

    /// Data rows did not match the configured row count
    #[error("Expected {expected} data rows in {path:?}, found {found}")]
    RowCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// Shapefile or its attribute table could not be decoded
    #[error("Shapefile error: {0}")]
    Shapefile(String),

    /// GeoJSON document could not be decoded
    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    /// Boundary file extension is not one we can read
    #[error("Unsupported boundary format: {0:?}")]
    UnsupportedFormat(PathBuf),

    /// Coordinate reference system we cannot reproject from
    #[error("Unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),
}

impl From<shapefile::Error> for PipelineError {
    fn from(err: shapefile::Error) -> Self {
        PipelineError::Shapefile(err.to_string())
    }
}

impl From<geojson::Error> for PipelineError {
    fn from(err: geojson::Error) -> Self {
        PipelineError::GeoJson(err.to_string())
    }
}

impl PipelineError {
    /// Wrap an I/O error with the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::export::{ExportFormat, ExportKind};
use crate::pipeline::{JoinReport, Metric};
use crate::selection::{Selection, SelectionAction};

// ============================================
// COUNTY DTOs
// ============================================

/// Selectable counties
#[derive(Debug, Serialize)]
pub struct CountyListResponse {
    /// Display names, sorted
    pub counties: Vec<String>,
    /// Total count
    pub total: usize,
}

/// Dataset summary
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Number of joined counties
    pub records: usize,
    /// CRS the boundaries were read in
    pub source_crs: String,
    /// CRS of served geometries
    pub crs: String,
    /// [min, max] median income
    pub median_income_range: Option<[f64; 2]>,
    /// [min, max] unemployment rate
    pub unemployment_rate_range: Option<[f64; 2]>,
    /// Rows dropped while joining
    pub report: JoinReport,
}

// ============================================
// SELECTION DTOs
// ============================================

/// Compute the next selection of one multiselect
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    /// Current selection; absent means every county
    #[serde(default)]
    pub current: Option<Selection>,
    /// Triggering action
    pub action: SelectionAction,
}

/// Next selection
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub counties: Selection,
    pub total: usize,
}

// ============================================
// MAP DTOs
// ============================================

/// Choropleth or bar chart request
#[derive(Debug, Deserialize)]
pub struct MapRequest {
    /// Metric to colour or plot by
    pub metric: Metric,
    /// Selected counties; absent means every county
    #[serde(default)]
    pub counties: Option<Vec<String>>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Dataset status
    pub dataset: String,
    /// Number of joined counties
    pub records: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
    /// Response time, RFC 3339
    pub timestamp: String,
}

// ============================================
// EXPORT DTOs
// ============================================

/// Export request
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// Columns to export
    #[serde(default = "default_export_kind")]
    pub kind: ExportKind,
    /// File format: csv, xlsx
    #[serde(default = "default_export_format")]
    pub format: ExportFormat,
    /// Income map selection; absent means every county
    #[serde(default)]
    pub income: Option<Vec<String>>,
    /// Unemployment map selection; absent means every county
    #[serde(default)]
    pub unemployment: Option<Vec<String>>,
}

fn default_export_kind() -> ExportKind {
    ExportKind::Both
}

fn default_export_format() -> ExportFormat {
    ExportFormat::Csv
}

/// Turn an optional county list into a selection over `options`
pub fn resolve_selection(requested: Option<Vec<String>>, options: &[String]) -> Selection {
    match requested {
        None => Selection::all(options),
        Some(counties) => Selection::from_iter(counties).restrict_to(options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_request_defaults() {
        let req: ExportRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.kind, ExportKind::Both);
        assert_eq!(req.format, ExportFormat::Csv);
        assert!(req.income.is_none());
    }

    #[test]
    fn test_resolve_selection() {
        let options = vec!["Anoka".to_string(), "Hennepin".to_string()];

        assert_eq!(resolve_selection(None, &options).len(), 2);
        assert!(resolve_selection(Some(Vec::new()), &options).is_empty());
        assert_eq!(
            resolve_selection(Some(vec!["Hennepin".to_string(), "Cook".to_string()]), &options),
            Selection::from_iter(["Hennepin"])
        );
    }
}

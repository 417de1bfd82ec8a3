//! Data Export
//!
//! Downloads of the currently selected counties, as CSV or as an XLSX workbook.
//!
//! - `MedianIncome` exports the income map's selection
//! - `UnemploymentRate` exports the unemployment map's selection
//! - `Both` outer-merges the two selections on the county name

mod csv_writer;
mod xlsx_writer;

pub use csv_writer::write_csv;
pub use xlsx_writer::write_xlsx;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::pipeline::{Dataset, Metric};
use crate::selection::DashboardSelection;

/// Which columns to export
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    MedianIncome,
    UnemploymentRate,
    Both,
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "median_income" | "income" => Ok(ExportKind::MedianIncome),
            "unemployment_rate" | "unemployment" => Ok(ExportKind::UnemploymentRate),
            "both" => Ok(ExportKind::Both),
            other => Err(format!("Unknown export kind: {}", other)),
        }
    }
}

/// File format of an export
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// A rectangular export: `County` followed by one column per metric
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub metrics: Vec<Metric>,
    pub rows: Vec<ExportRow>,
}

/// One exported county
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub county: String,
    /// One value per entry of `ExportTable::metrics`
    pub values: Vec<Option<f64>>,
}

impl ExportTable {
    /// Header row
    pub fn columns(&self) -> Vec<&'static str> {
        std::iter::once("County")
            .chain(self.metrics.iter().map(Metric::column))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build the export for the current selections
    pub fn build(dataset: &Dataset, kind: ExportKind, selection: &DashboardSelection) -> Self {
        match kind {
            ExportKind::MedianIncome | ExportKind::UnemploymentRate => {
                let metric = if kind == ExportKind::MedianIncome {
                    Metric::MedianIncome
                } else {
                    Metric::UnemploymentRate
                };
                let rows = dataset
                    .filter(selection.for_metric(metric))
                    .into_iter()
                    .map(|r| ExportRow {
                        county: r.display_name.clone(),
                        values: vec![metric.value(r)],
                    })
                    .collect();
                Self {
                    metrics: vec![metric],
                    rows,
                }
            }
            ExportKind::Both => {
                // Outer merge on county name, sorted by name
                let mut merged: BTreeMap<String, [Option<f64>; 2]> = BTreeMap::new();
                for (slot, metric) in Metric::all().iter().enumerate() {
                    for record in dataset.filter(selection.for_metric(*metric)) {
                        merged.entry(record.display_name.clone()).or_default()[slot] =
                            metric.value(record);
                    }
                }
                Self {
                    metrics: Metric::all().to_vec(),
                    rows: merged
                        .into_iter()
                        .map(|(county, values)| ExportRow {
                            county,
                            values: values.to_vec(),
                        })
                        .collect(),
                }
            }
        }
    }
}

/// A rendered export file
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render a table in the requested format
pub fn render(
    table: &ExportTable,
    format: ExportFormat,
    file_stem: &str,
    sheet_name: &str,
) -> ExportResult<ExportFile> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(table)?,
        ExportFormat::Xlsx => write_xlsx(table, sheet_name)?,
    };

    tracing::debug!(
        format = format.extension(),
        rows = table.rows.len(),
        bytes = bytes.len(),
        "Rendered export"
    );

    Ok(ExportFile {
        file_name: format!("{}.{}", file_stem, format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

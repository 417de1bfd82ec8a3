//! Core data types for the county data pipeline
//!
//! This module defines the fundamental types used throughout the crate:
//! - `Metric`: Which county statistic is meant
//! - `StatRow` / `StatTable`: One coerced statistics table
//! - `BoundaryRow`: One county polygon from the boundary source
//! - `CountyRecord`: A fully joined county, ready for map rendering
//! - `Dataset`: The joined collection plus its join report

use geo::{BoundingRect, MultiPolygon, Rect};
use serde::{Deserialize, Serialize};

use super::join::JoinReport;
use super::normalize::{coerce_income, coerce_rate};
use super::reproject::Crs;
use crate::selection::Selection;

/// County statistic carried by a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Median household income in dollars
    MedianIncome,
    /// Unemployment rate in percent
    UnemploymentRate,
}

impl Metric {
    /// Get all metrics for iteration
    pub fn all() -> &'static [Metric] {
        &[Metric::MedianIncome, Metric::UnemploymentRate]
    }

    /// Column name used in exports and feature properties
    pub fn column(&self) -> &'static str {
        match self {
            Metric::MedianIncome => "median_income",
            Metric::UnemploymentRate => "unemployment_rate",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Metric::MedianIncome => "Median Income",
            Metric::UnemploymentRate => "Unemployment Rate",
        }
    }

    /// Coerce a raw cell from this metric's source table
    pub fn coerce(&self, raw: &str) -> Option<f64> {
        match self {
            Metric::MedianIncome => coerce_income(raw),
            Metric::UnemploymentRate => coerce_rate(raw),
        }
    }

    /// Read this metric from a joined record
    pub fn value(&self, record: &CountyRecord) -> Option<f64> {
        match self {
            Metric::MedianIncome => record.median_income,
            Metric::UnemploymentRate => record.unemployment_rate,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "median_income" | "income" => Ok(Metric::MedianIncome),
            "unemployment_rate" | "unemployment" | "unemp" => Ok(Metric::UnemploymentRate),
            other => Err(format!("Unknown metric: {}", other)),
        }
    }
}

/// One data row of a statistics table after normalization
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    /// Canonical county key
    pub county: String,
    /// County cell as it appeared in the file
    pub raw_county: String,
    /// Coerced value, `None` when the cell did not parse
    pub value: Option<f64>,
    /// 1-based line number in the source file
    pub line: usize,
}

/// A loaded statistics table
#[derive(Debug, Clone)]
pub struct StatTable {
    pub metric: Metric,
    pub rows: Vec<StatRow>,
}

impl StatTable {
    pub fn new(metric: Metric, rows: Vec<StatRow>) -> Self {
        Self { metric, rows }
    }

    /// Number of rows whose value failed to coerce
    pub fn missing_values(&self) -> usize {
        self.rows.iter().filter(|r| r.value.is_none()).count()
    }
}

/// One county polygon from the boundary source, already filtered to the target state
#[derive(Debug, Clone)]
pub struct BoundaryRow {
    /// State FIPS code
    pub state_fips: String,
    /// Name field exactly as stored in the boundary source
    pub name: String,
    /// Trimmed name used as the join key
    pub county: String,
    /// Full county GEOID when the source has one
    pub geoid: Option<String>,
    /// Boundary in the source CRS
    pub geometry: MultiPolygon<f64>,
}

/// A county with both statistics and a boundary in EPSG:4326
#[derive(Debug, Clone, Serialize)]
pub struct CountyRecord {
    /// Boundary source name, used as the map feature id
    pub name: String,
    /// Canonical county key, used for display and export
    pub display_name: String,
    pub state_fips: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geoid: Option<String>,
    pub median_income: Option<f64>,
    pub unemployment_rate: Option<f64>,
    #[serde(skip)]
    pub geometry: MultiPolygon<f64>,
}

/// The joined county collection
///
/// Built once per process and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<CountyRecord>,
    report: JoinReport,
    source_crs: Crs,
}

impl Dataset {
    pub fn new(records: Vec<CountyRecord>, report: JoinReport, source_crs: Crs) -> Self {
        Self {
            records,
            report,
            source_crs,
        }
    }

    /// Joined records in boundary-source order
    pub fn records(&self) -> &[CountyRecord] {
        &self.records
    }

    /// Counts and keys dropped while joining
    pub fn report(&self) -> &JoinReport {
        &self.report
    }

    /// CRS the boundaries were read in (records are always EPSG:4326)
    pub fn source_crs(&self) -> Crs {
        self.source_crs
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, de-duplicated display names (the selectable options)
    pub fn counties(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .records
            .iter()
            .map(|r| r.display_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Look up a record by display name
    pub fn get(&self, display_name: &str) -> Option<&CountyRecord> {
        self.records.iter().find(|r| r.display_name == display_name)
    }

    /// Minimum and maximum of a metric over all records, ignoring missing values
    pub fn range(&self, metric: Metric) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| metric.value(r))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Records whose display name is selected, in dataset order
    pub fn filter(&self, selection: &Selection) -> Vec<&CountyRecord> {
        self.records
            .iter()
            .filter(|r| selection.contains(&r.display_name))
            .collect()
    }
}

/// Bounding box around a set of records, `None` when there are none
pub fn bounds<'a>(records: impl IntoIterator<Item = &'a CountyRecord>) -> Option<Rect<f64>> {
    records
        .into_iter()
        .filter_map(|r| r.geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            )
        })
}

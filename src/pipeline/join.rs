//! Key joins
//!
//! Both joins are inner joins on the canonical county key. Rows that fail to
//! match are dropped, but every drop is recorded in a [`JoinReport`] so a
//! shrinking dataset never goes unnoticed.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::types::{BoundaryRow, CountyRecord, StatRow, StatTable};

/// Both statistics for one county
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedStat {
    pub county: String,
    pub median_income: Option<f64>,
    pub unemployment_rate: Option<f64>,
}

/// What the joins kept and dropped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinReport {
    /// Rows read from the income table
    pub income_rows: usize,
    /// Rows read from the unemployment table
    pub unemployment_rows: usize,
    /// Income cells that failed to coerce
    pub income_missing: usize,
    /// Unemployment cells that failed to coerce
    pub unemployment_missing: usize,
    /// Keys repeated within a single source (first occurrence kept)
    pub duplicate_keys: Vec<String>,
    /// Counties only in the income table
    pub income_only: Vec<String>,
    /// Counties only in the unemployment table
    pub unemployment_only: Vec<String>,
    /// Boundary rows for the target state
    pub boundary_rows: usize,
    /// In-state boundaries skipped for a non-polygon geometry
    pub invalid_geometries: Vec<String>,
    /// Boundaries without combined statistics
    pub boundaries_without_stats: Vec<String>,
    /// Combined statistics without a boundary
    pub stats_without_boundary: Vec<String>,
    /// Records in the final dataset
    pub joined: usize,
}

impl JoinReport {
    /// Total number of keys dropped by either join
    pub fn dropped(&self) -> usize {
        self.income_only.len()
            + self.unemployment_only.len()
            + self.invalid_geometries.len()
            + self.boundaries_without_stats.len()
            + self.stats_without_boundary.len()
    }

    /// True when nothing was dropped or duplicated
    pub fn is_clean(&self) -> bool {
        self.dropped() == 0 && self.duplicate_keys.is_empty()
    }

    /// Emit one log line per kind of drop
    pub fn log(&self) {
        let sections = [
            ("income only", &self.income_only),
            ("unemployment only", &self.unemployment_only),
            ("invalid geometry", &self.invalid_geometries),
            ("boundary without statistics", &self.boundaries_without_stats),
            ("statistics without boundary", &self.stats_without_boundary),
            ("duplicate key", &self.duplicate_keys),
        ];
        for (reason, keys) in sections {
            if !keys.is_empty() {
                tracing::warn!(
                    reason,
                    count = keys.len(),
                    counties = %keys.join(", "),
                    "Dropped counties during join"
                );
            }
        }

        tracing::info!(
            joined = self.joined,
            dropped = self.dropped(),
            income_missing = self.income_missing,
            unemployment_missing = self.unemployment_missing,
            "Join complete"
        );
    }
}

/// Inner join of the two statistics tables, in income table order
pub fn join_statistics(
    income: &StatTable,
    unemployment: &StatTable,
    report: &mut JoinReport,
) -> Vec<CombinedStat> {
    report.income_rows = income.rows.len();
    report.unemployment_rows = unemployment.rows.len();
    report.income_missing = income.missing_values();
    report.unemployment_missing = unemployment.missing_values();

    let income_rows = dedupe(&income.rows, "income", report);
    let unemployment_rows = dedupe(&unemployment.rows, "unemployment", report);

    let rates: HashMap<&str, Option<f64>> = unemployment_rows
        .iter()
        .map(|r| (r.county.as_str(), r.value))
        .collect();

    let mut combined = Vec::with_capacity(income_rows.len());
    for row in &income_rows {
        match rates.get(row.county.as_str()) {
            Some(rate) => combined.push(CombinedStat {
                county: row.county.clone(),
                median_income: row.value,
                unemployment_rate: *rate,
            }),
            None => report.income_only.push(row.county.clone()),
        }
    }

    let income_keys: HashSet<&str> = income_rows.iter().map(|r| r.county.as_str()).collect();
    report.unemployment_only.extend(
        unemployment_rows
            .iter()
            .filter(|r| !income_keys.contains(r.county.as_str()))
            .map(|r| r.county.clone()),
    );

    combined
}

/// Inner join of state boundaries with combined statistics, in boundary order
pub fn join_boundaries(
    boundaries: Vec<BoundaryRow>,
    stats: &[CombinedStat],
    report: &mut JoinReport,
) -> Vec<CountyRecord> {
    report.boundary_rows = boundaries.len();

    let by_county: HashMap<&str, &CombinedStat> =
        stats.iter().map(|s| (s.county.as_str(), s)).collect();
    let mut matched: HashSet<String> = HashSet::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::with_capacity(boundaries.len());

    for boundary in boundaries {
        if !seen.insert(boundary.county.clone()) {
            report
                .duplicate_keys
                .push(format!("boundary:{}", boundary.county));
            continue;
        }

        let Some(stat) = by_county.get(boundary.county.as_str()) else {
            report.boundaries_without_stats.push(boundary.county);
            continue;
        };

        matched.insert(boundary.county.clone());
        records.push(CountyRecord {
            name: boundary.name,
            display_name: boundary.county,
            state_fips: boundary.state_fips,
            geoid: boundary.geoid,
            median_income: stat.median_income,
            unemployment_rate: stat.unemployment_rate,
            geometry: boundary.geometry,
        });
    }

    report.stats_without_boundary.extend(
        stats
            .iter()
            .filter(|s| !matched.contains(&s.county))
            .map(|s| s.county.clone()),
    );
    report.joined = records.len();

    records
}

/// Keep the first row per key, recording repeats as `source:key`
fn dedupe<'a>(rows: &'a [StatRow], source: &str, report: &mut JoinReport) -> Vec<&'a StatRow> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(row.county.as_str()) {
            unique.push(row);
        } else {
            tracing::debug!(source, county = %row.county, line = row.line, "Duplicate county row");
            report.duplicate_keys.push(format!("{}:{}", source, row.county));
        }
    }
    unique
}

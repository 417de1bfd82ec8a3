//! Dataset loader
//!
//! Runs the whole join pipeline:
//!
//! ```text
//! income.csv ───────┐
//!                   ├─ join_statistics ─┐
//! unemployment.csv ─┘                   ├─ join_boundaries ─ reproject ─ Dataset
//! boundaries (state filter) ────────────┘
//! ```

use std::path::Path;
use std::time::Instant;

use super::boundary::{open_boundary_source, BoundaryFilter, BoundarySet, BoundarySource};
use super::error::PipelineResult;
use super::join::{join_boundaries, join_statistics, JoinReport};
use super::stats::StatTableReader;
use super::types::{Dataset, Metric, StatTable};
use crate::config::DataConfig;

/// Loads the configured inputs into a [`Dataset`]
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    config: DataConfig,
}

impl DatasetLoader {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    /// Read all three inputs from disk and join them
    pub fn load(&self) -> PipelineResult<Dataset> {
        let start = Instant::now();

        let income = self.read_table(Metric::MedianIncome)?;
        let unemployment = self.read_table(Metric::UnemploymentRate)?;

        let source = open_boundary_source(&self.config.boundary)?;
        let dataset = self.load_with(&income, &unemployment, source.as_ref())?;

        tracing::info!(
            records = dataset.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Join already-loaded tables with a boundary source
    pub fn load_with(
        &self,
        income: &StatTable,
        unemployment: &StatTable,
        source: &dyn BoundarySource,
    ) -> PipelineResult<Dataset> {
        let filter = BoundaryFilter::from(&self.config.boundary);
        let boundaries = source.read(&filter)?;
        tracing::info!(
            source = %source.describe(),
            state_fips = %filter.state_fips,
            total = boundaries.total,
            kept = boundaries.rows.len(),
            crs = %boundaries.crs,
            "Loaded boundaries"
        );
        Ok(assemble(income, unemployment, boundaries))
    }

    fn read_table(&self, metric: Metric) -> PipelineResult<StatTable> {
        let source = match metric {
            Metric::MedianIncome => &self.config.income,
            Metric::UnemploymentRate => &self.config.unemployment,
        };
        StatTableReader::from_config(metric, source, self.config.header_scan_limit)
            .read_path(Path::new(&source.path))
    }
}

/// Join statistics with boundaries and reproject the result to EPSG:4326
pub fn assemble(income: &StatTable, unemployment: &StatTable, boundaries: BoundarySet) -> Dataset {
    let mut report = JoinReport::default();
    let combined = join_statistics(income, unemployment, &mut report);

    let BoundarySet {
        rows,
        crs,
        rejected,
        ..
    } = boundaries;
    report.invalid_geometries = rejected;
    let mut records = join_boundaries(rows, &combined, &mut report);

    let reprojected = crs.reproject_all(records.iter_mut().map(|r| &mut r.geometry));
    tracing::debug!(count = reprojected, from = %crs, "Reprojected boundaries to EPSG:4326");

    report.log();
    Dataset::new(records, report, crs)
}

//! Statistics table loading
//!
//! Reads a delimited statistics export (one row per county) and produces a
//! coerced [`StatTable`]. Source files open with a few lines of title and notes
//! before the real header, so the header row is located by its column names
//! instead of by a fixed offset.

use std::io::Read;
use std::path::Path;

use super::error::{PipelineError, PipelineResult};
use super::normalize::canonical_county_key;
use super::types::{Metric, StatRow, StatTable};
use crate::config::StatSourceConfig;

/// How many leading records are searched for the header row by default
pub const DEFAULT_HEADER_SCAN_LIMIT: usize = 20;

/// Reader for one statistics table with configurable column names
#[derive(Debug, Clone)]
pub struct StatTableReader {
    metric: Metric,
    /// Header of the free-text county column
    county_column: String,
    /// Header of the value column
    value_column: String,
    /// Maximum number of records searched for the header
    header_scan_limit: usize,
    /// Exact number of data rows the file must contain
    expected_rows: Option<usize>,
}

impl StatTableReader {
    /// Create a reader with the standard column names for a metric
    pub fn new(metric: Metric) -> Self {
        let value_column = match metric {
            Metric::MedianIncome => "Value (Dollars)",
            Metric::UnemploymentRate => "Value (Percent)",
        };
        Self {
            metric,
            county_column: "County".to_string(),
            value_column: value_column.to_string(),
            header_scan_limit: DEFAULT_HEADER_SCAN_LIMIT,
            expected_rows: None,
        }
    }

    /// Create a reader from a configured source
    pub fn from_config(metric: Metric, source: &StatSourceConfig, header_scan_limit: usize) -> Self {
        Self::new(metric)
            .with_county_column(&source.county_column)
            .with_value_column(&source.value_column)
            .with_header_scan_limit(header_scan_limit)
            .with_expected_rows(source.expected_rows)
    }

    /// Set the county column header
    pub fn with_county_column(mut self, column: &str) -> Self {
        self.county_column = column.to_string();
        self
    }

    /// Set the value column header
    pub fn with_value_column(mut self, column: &str) -> Self {
        self.value_column = column.to_string();
        self
    }

    /// Set how many leading records may precede the header
    pub fn with_header_scan_limit(mut self, limit: usize) -> Self {
        self.header_scan_limit = limit;
        self
    }

    /// Require an exact number of data rows
    pub fn with_expected_rows(mut self, expected: Option<usize>) -> Self {
        self.expected_rows = expected;
        self
    }

    /// Read a statistics table from a file
    pub fn read_path(&self, path: &Path) -> PipelineResult<StatTable> {
        let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
        self.read_from(file, path)
    }

    /// Read a statistics table from a string (useful for testing)
    pub fn read_str(&self, data: &str) -> PipelineResult<StatTable> {
        self.read_from(data.as_bytes(), Path::new("<memory>"))
    }

    fn read_from<R: Read>(&self, input: R, origin: &Path) -> PipelineResult<StatTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);
        let mut records = reader.records();

        // Locate the header row
        let mut scanned = 0;
        let (county_idx, value_idx) = loop {
            let next = if scanned < self.header_scan_limit {
                records.next()
            } else {
                None
            };
            let Some(result) = next else {
                return Err(PipelineError::HeaderNotFound {
                    path: origin.to_path_buf(),
                    columns: vec![self.county_column.clone(), self.value_column.clone()],
                    scanned,
                });
            };
            let record = result?;
            scanned += 1;
            if let Some(indices) = self.header_indices(&record) {
                tracing::debug!(
                    path = ?origin,
                    header_line = line_of(&record),
                    "Found statistics header"
                );
                break indices;
            }
        };

        // Data rows run until an empty record or a footnote line
        let mut rows = Vec::new();
        let mut data_rows = 0;
        let mut skipped = 0;
        let mut end_line = None;
        while let Some(result) = records.next() {
            let record = result?;
            let county_cell = record.get(county_idx).unwrap_or("");
            let value_cell = record.get(value_idx);

            let blank = county_cell.trim().is_empty()
                && value_cell.map_or(true, |v| v.trim().is_empty());
            if blank || (value_cell.is_none() && is_footnote(county_cell)) {
                end_line = Some(line_of(&record));
                break;
            }
            data_rows += 1;

            let county = canonical_county_key(county_cell);
            if county.is_empty() {
                tracing::debug!(path = ?origin, line = line_of(&record), "Skipping row without county");
                skipped += 1;
                continue;
            }
            if value_cell.is_none() {
                tracing::warn!(
                    path = ?origin,
                    line = line_of(&record),
                    county = %county,
                    "Row has no value cell"
                );
            }

            rows.push(StatRow {
                county,
                raw_county: county_cell.to_string(),
                value: value_cell.and_then(|v| self.metric.coerce(v)),
                line: line_of(&record),
            });
        }

        if let Some(line) = end_line {
            let ignored = records.count() + 1;
            tracing::warn!(
                path = ?origin,
                line,
                ignored,
                "Statistics table ended before end of file"
            );
        }

        if let Some(expected) = self.expected_rows {
            if data_rows != expected {
                return Err(PipelineError::RowCount {
                    path: origin.to_path_buf(),
                    expected,
                    found: data_rows,
                });
            }
        }

        let table = StatTable::new(self.metric, rows);
        tracing::info!(
            path = ?origin,
            metric = %self.metric,
            rows = table.rows.len(),
            skipped,
            missing_values = table.missing_values(),
            "Loaded statistics table"
        );
        Ok(table)
    }

    fn header_indices(&self, record: &csv::StringRecord) -> Option<(usize, usize)> {
        let find = |name: &str| {
            record
                .iter()
                .position(|cell| header_cell(cell).eq_ignore_ascii_case(name))
        };
        Some((find(&self.county_column)?, find(&self.value_column)?))
    }
}

fn header_cell(cell: &str) -> &str {
    cell.trim_start_matches('\u{feff}').trim()
}

/// A one-cell line that cannot be a county name, such as `Source: DEED`
fn is_footnote(cell: &str) -> bool {
    cell.chars()
        .any(|c| !(c.is_alphabetic() || c.is_whitespace() || matches!(c, '.' | '\'' | '-')))
}

fn line_of(record: &csv::StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INCOME_CSV: &str = "\
Median household income,,
Minnesota counties,,
Source: American Community Survey,,
,,
County,Value (Dollars),Margin of error
Hennepin County,\"74,621\",512
Ramsey County,\"62,140\",600
Anoka County,n/a,700
,,
Note: values in 2022 dollars
";

    #[test]
    fn test_header_detection_skips_preamble() {
        let table = StatTableReader::new(Metric::MedianIncome)
            .read_str(INCOME_CSV)
            .unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].county, "Hennepin");
        assert_eq!(table.rows[0].raw_county, "Hennepin County");
        assert_eq!(table.rows[0].value, Some(74621.0));
        assert_eq!(table.rows[0].line, 6);
        assert_eq!(table.rows[1].value, Some(62140.0));
    }

    #[test]
    fn test_coercion_failure_keeps_row() {
        let table = StatTableReader::new(Metric::MedianIncome)
            .read_str(INCOME_CSV)
            .unwrap();

        assert_eq!(table.rows[2].county, "Anoka");
        assert_eq!(table.rows[2].value, None);
        assert_eq!(table.missing_values(), 1);
    }

    #[test]
    fn test_stops_at_footnote_without_value_cell() {
        let csv_data = "County,Value (Percent)
Hennepin County,3.2
Ramsey County,3.6
Source: DEED";

        let table = StatTableReader::new(Metric::UnemploymentRate)
            .read_str(csv_data)
            .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].value, Some(3.6));
    }

    #[test]
    fn test_short_row_mid_table_is_kept() {
        let csv_data = "County,Value (Percent)
Hennepin County,3.2
Kittson County
Ramsey County,3.6
Anoka County,2.9
";

        let table = StatTableReader::new(Metric::UnemploymentRate)
            .read_str(csv_data)
            .unwrap();
        let counties: Vec<&str> = table.rows.iter().map(|r| r.county.as_str()).collect();
        assert_eq!(counties, vec!["Hennepin", "Kittson", "Ramsey", "Anoka"]);
        assert_eq!(table.rows[1].value, None);
        assert_eq!(table.missing_values(), 1);
        assert_eq!(table.rows[3].value, Some(2.9));
    }

    #[test]
    fn test_short_row_counts_toward_expected_rows() {
        let csv_data = "County,Value (Percent)\nSt. Louis County\nCook County,4.4\n";
        let table = StatTableReader::new(Metric::UnemploymentRate)
            .with_expected_rows(Some(2))
            .read_str(csv_data)
            .unwrap();
        assert_eq!(table.rows[0].county, "St. Louis");
    }

    #[test]
    fn test_footnote_detection() {
        assert!(is_footnote("Source: DEED"));
        assert!(is_footnote("Note (1) preliminary"));
        assert!(!is_footnote("Lac qui Parle County"));
        assert!(!is_footnote("St. Louis"));
        assert!(!is_footnote("Kittson County"));
    }

    #[test]
    fn test_header_not_found() {
        let csv_data = "Name,Amount\nHennepin,1";
        let err = StatTableReader::new(Metric::MedianIncome)
            .read_str(csv_data)
            .unwrap_err();
        assert!(matches!(err, PipelineError::HeaderNotFound { scanned: 2, .. }));
    }

    #[test]
    fn test_header_scan_limit() {
        let err = StatTableReader::new(Metric::MedianIncome)
            .with_header_scan_limit(3)
            .read_str(INCOME_CSV)
            .unwrap_err();
        assert!(matches!(err, PipelineError::HeaderNotFound { scanned: 3, .. }));
    }

    #[test]
    fn test_expected_rows_mismatch() {
        let err = StatTableReader::new(Metric::MedianIncome)
            .with_expected_rows(Some(91))
            .read_str(INCOME_CSV)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RowCount {
                expected: 91,
                found: 3,
                ..
            }
        ));

        let table = StatTableReader::new(Metric::MedianIncome)
            .with_expected_rows(Some(3))
            .read_str(INCOME_CSV)
            .unwrap();
        assert_eq!(table.rows.len(), 3);
    }

    #[test]
    fn test_custom_columns() {
        let csv_data = "Area,Rate\nOlmsted County,2.1";
        let table = StatTableReader::new(Metric::UnemploymentRate)
            .with_county_column("Area")
            .with_value_column("rate")
            .read_str(csv_data)
            .unwrap();
        assert_eq!(table.rows[0].county, "Olmsted");
        assert_eq!(table.rows[0].value, Some(2.1));
    }

    #[test]
    fn test_read_path_missing_file() {
        let err = StatTableReader::new(Metric::MedianIncome)
            .read_path(Path::new("/nonexistent/income.csv"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_read_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unemployment.csv");
        std::fs::write(&path, "a\nb\nc\nd\nCounty,Value (Percent)\nCook County,4.4\n").unwrap();

        let table = StatTableReader::new(Metric::UnemploymentRate)
            .read_path(&path)
            .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].county, "Cook");
    }
}

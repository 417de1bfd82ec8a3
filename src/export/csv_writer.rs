//! CSV export

use super::{ExportResult, ExportTable};

/// Write the table as CSV; missing values become empty fields
pub fn write_csv(table: &ExportTable) -> ExportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.county.clone());
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(format_value).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| super::ExportError::Io(e.into_error()))
}

/// Floats keep their decimal point, so `74621.0` is written as `74621.0`
fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportRow;
    use crate::pipeline::Metric;

    #[test]
    fn test_csv_output() {
        let table = ExportTable {
            metrics: vec![Metric::MedianIncome, Metric::UnemploymentRate],
            rows: vec![
                ExportRow {
                    county: "Hennepin".to_string(),
                    values: vec![Some(74621.0), Some(3.2)],
                },
                ExportRow {
                    county: "Lac qui Parle".to_string(),
                    values: vec![None, Some(2.5)],
                },
            ],
        };

        let csv = String::from_utf8(write_csv(&table).unwrap()).unwrap();
        assert_eq!(
            csv,
            "County,median_income,unemployment_rate\nHennepin,74621.0,3.2\nLac qui Parle,,2.5\n"
        );
    }

    #[test]
    fn test_csv_quotes_commas() {
        let table = ExportTable {
            metrics: vec![Metric::UnemploymentRate],
            rows: vec![ExportRow {
                county: "Dewey, SD".to_string(),
                values: vec![Some(1.5)],
            }],
        };

        let csv = String::from_utf8(write_csv(&table).unwrap()).unwrap();
        assert!(csv.contains("\"Dewey, SD\",1.5"));
    }
}

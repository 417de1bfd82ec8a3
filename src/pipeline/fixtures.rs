//! Shared test data

use geo::{polygon, MultiPolygon};
use std::path::Path;

use super::boundary::BoundaryFilter;
use super::join::JoinReport;
use super::reproject::Crs;
use super::types::{BoundaryRow, CountyRecord, Dataset, Metric, StatRow, StatTable};
use crate::config::{BoundaryConfig, DataConfig};

pub const HENNEPIN_INCOME_CSV: &str = "\
Median household income by county,
Minnesota,
American Community Survey 5-year estimates,
,
County,Value (Dollars)
Hennepin County,\"74,621\"
Ramsey County,\"62,140\"
Aitkin County,\"55,000\"
";

pub const HENNEPIN_UNEMPLOYMENT_CSV: &str = "\
Unemployment rate by county,
Minnesota,
Local Area Unemployment Statistics,
,
County,Value (Percent)
Hennepin County,3.2
Ramsey County,3.6
Aitkin County,4.1
Cook County,4.4
";

/// Unit square whose lower-left corner sits `offset` degrees east of -94,45
pub fn square(offset: f64) -> MultiPolygon<f64> {
    let x = -94.0 + offset;
    MultiPolygon::new(vec![polygon![
        (x: x, y: 45.0),
        (x: x + 1.0, y: 45.0),
        (x: x + 1.0, y: 46.0),
        (x: x, y: 46.0),
        (x: x, y: 45.0),
    ]])
}

pub fn record(name: &str, income: Option<f64>, rate: Option<f64>, offset: f64) -> CountyRecord {
    CountyRecord {
        name: name.to_string(),
        display_name: name.to_string(),
        state_fips: "27".to_string(),
        geoid: None,
        median_income: income,
        unemployment_rate: rate,
        geometry: square(offset),
    }
}

/// Three Minnesota counties, not in alphabetical order
pub fn sample_dataset() -> Dataset {
    let records = vec![
        record("Hennepin", Some(74621.0), Some(3.2), 0.0),
        record("Ramsey", Some(62140.0), Some(3.6), 1.0),
        record("Anoka", Some(86000.0), Some(2.9), 3.0),
    ];
    let report = JoinReport {
        joined: records.len(),
        ..JoinReport::default()
    };
    Dataset::new(records, report, Crs::Nad83)
}

pub fn boundary_row(name: &str, offset: f64) -> BoundaryRow {
    BoundaryRow {
        state_fips: "27".to_string(),
        name: name.to_string(),
        county: name.trim().to_string(),
        geoid: None,
        geometry: square(offset),
    }
}

pub fn stat_table(metric: Metric, rows: &[(&str, Option<f64>)]) -> StatTable {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, (county, value))| StatRow {
            county: county.to_string(),
            raw_county: format!("{} County", county),
            value: *value,
            line: i + 6,
        })
        .collect();
    StatTable::new(metric, rows)
}

/// Three Minnesota counties and one Wisconsin county
pub fn boundary_geojson() -> String {
    let feature = |state: &str, name: &str, geoid: &str, x: f64| {
        format!(
            r#"{{"type":"Feature","properties":{{"STATEFP":"{state}","NAME":"{name}","GEOID":"{geoid}"}},
                "geometry":{{"type":"Polygon","coordinates":[[[{x},45.0],[{x1},45.0],[{x1},46.0],[{x},46.0],[{x},45.0]]]}}}}"#,
            state = state,
            name = name,
            geoid = geoid,
            x = x,
            x1 = x + 1.0,
        )
    };
    format!(
        r#"{{"type":"FeatureCollection","features":[{},{},{},{}]}}"#,
        feature("27", "Hennepin", "27053", -94.0),
        feature("27", "Ramsey", "27123", -93.0),
        feature("55", "Dane", "55025", -90.0),
        feature("27", "Cook", "27031", -91.0),
    )
}

pub fn minnesota_filter() -> BoundaryFilter {
    BoundaryFilter::from(&BoundaryConfig::default())
}

/// Write the three inputs into `dir` and return a config pointing at them
pub fn write_inputs(dir: &Path, income_csv: &str, unemployment_csv: &str) -> DataConfig {
    let income = dir.join("income.csv");
    let unemployment = dir.join("unemployment.csv");
    let boundary = dir.join("counties.geojson");
    std::fs::write(&income, income_csv).unwrap();
    std::fs::write(&unemployment, unemployment_csv).unwrap();
    std::fs::write(&boundary, boundary_geojson()).unwrap();

    let mut config = DataConfig::default();
    config.income.path = income.to_string_lossy().to_string();
    config.unemployment.path = unemployment.to_string_lossy().to_string();
    config.boundary.path = boundary.to_string_lossy().to_string();
    config
}

//! Map and chart payloads
//!
//! Everything a front end needs to draw the two choropleths and the bar charts.
//! Features are matched to data rows through the boundary source's `NAME`
//! property, the same way the rendered map looks them up.

use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Serialize;
use serde_json::json;

use crate::pipeline::{bounds, CountyRecord, Dataset, Metric};
use crate::selection::Selection;

/// Property the rendered map uses to match features to data rows
pub const FEATURE_ID_KEY: &str = "properties.NAME";

/// Colour scale for both choropleths
pub const COLOR_SCALE: &str = "Reds";

/// One choropleth layer
#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethLayer {
    pub metric: Metric,
    pub title: String,
    pub feature_id_key: &'static str,
    /// Feature ids (`NAME`) of the selected counties
    pub locations: Vec<String>,
    /// Metric value per location
    pub values: Vec<Option<f64>>,
    /// Hover text data per location
    pub hover: Vec<HoverRow>,
    /// Colour range over the whole dataset, so colours stay put while filtering
    pub range: Option<[f64; 2]>,
    pub color_scale: &'static str,
    /// `[min_lon, min_lat, max_lon, max_lat]` of the selected counties
    pub bounds: Option<[f64; 4]>,
}

/// Hover data for one county
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HoverRow {
    pub county_display: String,
    pub median_income: Option<f64>,
    pub unemployment_rate: Option<f64>,
}

/// Bar chart series for one metric
#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub metric: Metric,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// All records as a GeoJSON FeatureCollection
pub fn feature_collection(dataset: &Dataset) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: dataset.records().iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

fn to_feature(record: &CountyRecord) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("NAME".to_string(), json!(record.name));
    properties.insert("county_display".to_string(), json!(record.display_name));
    properties.insert("STATEFP".to_string(), json!(record.state_fips));
    properties.insert("GEOID".to_string(), json!(record.geoid));
    properties.insert("median_income".to_string(), json!(record.median_income));
    properties.insert("unemployment_rate".to_string(), json!(record.unemployment_rate));

    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&record.geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Choropleth layer for one metric restricted to the selected counties
pub fn choropleth(dataset: &Dataset, metric: Metric, selection: &Selection) -> ChoroplethLayer {
    let selected = dataset.filter(selection);

    ChoroplethLayer {
        metric,
        title: format!("{} by County", metric.label()),
        feature_id_key: FEATURE_ID_KEY,
        locations: selected.iter().map(|r| r.name.clone()).collect(),
        values: selected.iter().map(|r| metric.value(r)).collect(),
        hover: selected
            .iter()
            .map(|r| HoverRow {
                county_display: r.display_name.clone(),
                median_income: r.median_income,
                unemployment_rate: r.unemployment_rate,
            })
            .collect(),
        range: dataset.range(metric).map(|(lo, hi)| [lo, hi]),
        color_scale: COLOR_SCALE,
        bounds: bounds(selected.iter().copied())
            .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y]),
    }
}

/// Bar chart of the selected counties in dataset order
pub fn bar_chart(dataset: &Dataset, metric: Metric, selection: &Selection) -> BarChart {
    let selected = dataset.filter(selection);
    let title = match metric {
        Metric::MedianIncome => "Median Household Income Comparison",
        Metric::UnemploymentRate => "Unemployment Rate Comparison",
    };

    BarChart {
        metric,
        title: title.to_string(),
        labels: selected.iter().map(|r| r.display_name.clone()).collect(),
        values: selected.iter().map(|r| metric.value(r)).collect(),
    }
}

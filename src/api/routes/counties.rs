//! County Routes
//!
//! - GET /api/v1/counties - Selectable county names
//! - GET /api/v1/summary - Record count, value ranges and join report
//! - GET /api/v1/geojson - All county boundaries as a FeatureCollection

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CountyListResponse, SummaryResponse};
use crate::api::state::AppState;
use crate::pipeline::{Crs, Metric};

/// GET /api/v1/counties
pub async fn list_counties(State(state): State<Arc<AppState>>) -> Json<CountyListResponse> {
    let counties = state.counties.as_ref().clone();
    let total = counties.len();
    Json(CountyListResponse { counties, total })
}

/// GET /api/v1/summary
pub async fn summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    let range = |metric| state.dataset.range(metric).map(|(min, max)| [min, max]);

    Json(SummaryResponse {
        records: state.dataset.len(),
        source_crs: state.dataset.source_crs().to_string(),
        crs: Crs::Wgs84.to_string(),
        median_income_range: range(Metric::MedianIncome),
        unemployment_rate_range: range(Metric::UnemploymentRate),
        report: state.dataset.report().clone(),
    })
}

/// GET /api/v1/geojson
///
/// Served from the string rendered at startup.
pub async fn geojson(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/geo+json")],
        state.geojson.as_ref().clone(),
    )
        .into_response()
}

//! Map Routes
//!
//! - POST /api/v1/choropleth - Choropleth layer for the selected counties
//! - POST /api/v1/chart - Bar chart series for the selected counties

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{resolve_selection, MapRequest};
use crate::api::state::AppState;
use crate::map::{self, BarChart, ChoroplethLayer};

/// POST /api/v1/choropleth
pub async fn choropleth(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MapRequest>,
) -> Json<ChoroplethLayer> {
    let selection = resolve_selection(req.counties, &state.counties);
    Json(map::choropleth(&state.dataset, req.metric, &selection))
}

/// POST /api/v1/chart
pub async fn bar_chart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MapRequest>,
) -> Json<BarChart> {
    let selection = resolve_selection(req.counties, &state.counties);
    Json(map::bar_chart(&state.dataset, req.metric, &selection))
}

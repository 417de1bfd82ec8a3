//! Selection Routes
//!
//! - POST /api/v1/selection - Apply a multiselect or button action

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{SelectionRequest, SelectionResponse};
use crate::api::state::AppState;
use crate::selection::Selection;

/// POST /api/v1/selection
///
/// Stateless: the client sends its current selection with every action.
pub async fn next_selection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectionRequest>,
) -> Json<SelectionResponse> {
    let options = state.counties.as_slice();
    let current = req
        .current
        .map(|selection| selection.restrict_to(options))
        .unwrap_or_else(|| Selection::all(options));

    let counties = current.apply(&req.action, options);
    let total = counties.len();

    tracing::debug!(action = ?req.action, selected = total, "Selection updated");

    Json(SelectionResponse { counties, total })
}

//! Export Routes
//!
//! Download of the selected counties' figures.
//!
//! - POST /api/v1/export - CSV or Excel attachment

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{resolve_selection, ExportRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::export::{self, ExportTable};
use crate::selection::DashboardSelection;

/// POST /api/v1/export
///
/// Each metric column is filtered by its own map's selection. An empty
/// selection still yields a file holding only the header row.
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExportRequest>,
) -> ApiResult<Response> {
    if !state.config.enable_export {
        return Err(ApiError::Validation(
            "Export feature is disabled".to_string(),
        ));
    }

    let selection = DashboardSelection {
        income: resolve_selection(req.income, &state.counties),
        unemployment: resolve_selection(req.unemployment, &state.counties),
    };

    let table = ExportTable::build(&state.dataset, req.kind, &selection);
    let file = export::render(
        &table,
        req.format,
        &state.export.file_stem,
        &state.export.sheet_name,
    )?;

    tracing::info!(
        kind = ?req.kind,
        format = %file.content_type,
        rows = table.rows.len(),
        bytes = file.bytes.len(),
        "Exported selection"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        Body::from(file.bytes),
    )
        .into_response())
}

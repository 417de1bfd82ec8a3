//! Countyscope REST API
//!
//! HTTP API layer serving the joined county dataset, built with Axum.
//!
//! # Endpoints
//!
//! ## Counties
//! - `GET /api/v1/counties` - Selectable county names
//! - `GET /api/v1/summary` - Record count, value ranges and join report
//! - `GET /api/v1/geojson` - County boundaries as GeoJSON
//!
//! ## Selection
//! - `POST /api/v1/selection` - Next selection after a multiselect action
//!
//! ## Maps and charts
//! - `POST /api/v1/choropleth` - Choropleth layer for a metric
//! - `POST /api/v1/chart` - Bar chart series for a metric
//!
//! ## Export
//! - `POST /api/v1/export` - CSV or Excel download
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use countyscope::api::{serve, AppState};
//! use countyscope::config::Config;
//! use countyscope::pipeline::DatasetLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let dataset = DatasetLoader::new(config.data.clone()).load()?;
//!
//!     let state = AppState::new(dataset, config.api.clone(), config.export.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // County routes
        .route("/counties", get(routes::counties::list_counties))
        .route("/summary", get(routes::counties::summary))
        .route("/geojson", get(routes::counties::geojson))
        // Selection routes
        .route("/selection", post(routes::selection::next_selection))
        // Map routes
        .route("/choropleth", post(routes::map::choropleth))
        .route("/chart", post(routes::map::bar_chart))
        // Export routes
        .route("/export", post(routes::export::export_data));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Countyscope API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Countyscope API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::pipeline::fixtures::sample_dataset;
    use crate::pipeline::{Crs, Dataset, JoinReport};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        build_router(AppState::new(
            sample_dataset(),
            ApiConfig::default(),
            ExportConfig::default(),
        ))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let response = get(create_test_app(), "/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let response = get(create_test_app(), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_without_data() {
        let empty = Dataset::new(Vec::new(), JoinReport::default(), Crs::Nad83);
        let app = build_router(AppState::new(
            empty,
            ApiConfig::default(),
            ExportConfig::default(),
        ));

        let response = get(app, "/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_full() {
        let response = get(create_test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["records"], 3);
    }

    #[tokio::test]
    async fn test_list_counties() {
        let response = get(create_test_app(), "/api/v1/counties").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["counties"], json!(["Anoka", "Hennepin", "Ramsey"]));
        assert_eq!(body["total"], 3);
    }

    #[tokio::test]
    async fn test_summary() {
        let body = body_json(get(create_test_app(), "/api/v1/summary").await).await;

        assert_eq!(body["records"], 3);
        assert_eq!(body["source_crs"], "EPSG:4269");
        assert_eq!(body["crs"], "EPSG:4326");
        assert_eq!(body["median_income_range"], json!([62140.0, 86000.0]));
        assert_eq!(body["unemployment_rate_range"], json!([2.9, 3.6]));
    }

    #[tokio::test]
    async fn test_geojson() {
        let response = get(create_test_app(), "/api/v1/geojson").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/geo+json"
        );

        let body = body_json(response).await;
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 3);
        assert_eq!(body["features"][0]["properties"]["NAME"], "Hennepin");
    }

    #[tokio::test]
    async fn test_selection_unselect_all() {
        let response = post_json(
            create_test_app(),
            "/api/v1/selection",
            json!({ "action": { "type": "unselect_all" } }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["counties"], json!([]));
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_selection_toggle_from_current() {
        let body = body_json(
            post_json(
                create_test_app(),
                "/api/v1/selection",
                json!({
                    "current": ["Hennepin", "Cook"],
                    "action": { "type": "toggle", "county": "Ramsey" }
                }),
            )
            .await,
        )
        .await;

        // Cook is not an option and is dropped
        assert_eq!(body["counties"], json!(["Hennepin", "Ramsey"]));
    }

    #[tokio::test]
    async fn test_selection_unknown_action() {
        let response = post_json(
            create_test_app(),
            "/api/v1/selection",
            json!({ "action": { "type": "select_some" } }),
        )
        .await;

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_choropleth_filters_selection() {
        let body = body_json(
            post_json(
                create_test_app(),
                "/api/v1/choropleth",
                json!({ "metric": "median_income", "counties": ["Ramsey"] }),
            )
            .await,
        )
        .await;

        assert_eq!(body["locations"], json!(["Ramsey"]));
        assert_eq!(body["values"], json!([62140.0]));
        assert_eq!(body["feature_id_key"], "properties.NAME");
        // Colour range stays on the full dataset
        assert_eq!(body["range"], json!([62140.0, 86000.0]));
    }

    #[tokio::test]
    async fn test_chart_defaults_to_all_counties() {
        let body = body_json(
            post_json(
                create_test_app(),
                "/api/v1/chart",
                json!({ "metric": "unemployment_rate" }),
            )
            .await,
        )
        .await;

        assert_eq!(body["labels"].as_array().unwrap().len(), 3);
        assert_eq!(body["values"], json!([3.2, 3.6, 2.9]));
    }

    #[tokio::test]
    async fn test_choropleth_invalid_metric() {
        let response = post_json(
            create_test_app(),
            "/api/v1/choropleth",
            json!({ "metric": "population" }),
        )
        .await;

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_export_csv() {
        let response = post_json(
            create_test_app(),
            "/api/v1/export",
            json!({
                "kind": "both",
                "format": "csv",
                "income": ["Hennepin"],
                "unemployment": ["Ramsey"]
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"mn_selected_data.csv\""
        );

        let text = String::from_utf8(body_bytes(response).await).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "County,median_income,unemployment_rate");
        assert_eq!(lines[1], "Hennepin,74621.0,");
        assert_eq!(lines[2], "Ramsey,,3.6");
        assert_eq!(lines.len(), 3);
    }

    #[tokio::test]
    async fn test_export_empty_selection() {
        let response = post_json(
            create_test_app(),
            "/api/v1/export",
            json!({ "kind": "median_income", "income": [] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert_eq!(text.trim_end(), "County,median_income");
    }

    #[tokio::test]
    async fn test_export_xlsx() {
        let response = post_json(
            create_test_app(),
            "/api/v1/export",
            json!({ "format": "xlsx" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = body_bytes(response).await;
        // xlsx is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_export_disabled() {
        let config = ApiConfig {
            enable_export: false,
            ..ApiConfig::default()
        };
        let app = build_router(AppState::new(
            sample_dataset(),
            config,
            ExportConfig::default(),
        ));

        let response = post_json(app, "/api/v1/export", json!({})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = get(create_test_app(), "/api/v1/nonexistent").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::services::ServeDir;

use crate::handlers::{convert, health, index};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;
use crate::ws::ws_listen;

/// Body allowance on top of the file limit for multipart framing and the
/// optional `conversionId` field.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let convert_routes = Router::new()
        .route("/convert", post(convert))
        .layer(DefaultBodyLimit::max(
            state
                .config
                .max_upload_bytes
                .saturating_add(MULTIPART_OVERHEAD_BYTES),
        ));

    let page_routes = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_listen));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Generated GIFs and client assets, under /public and at the root
    let public_dir = state.storage.public_dir().to_path_buf();

    Router::new()
        .merge(convert_routes)
        .merge(page_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest_service("/public", ServeDir::new(&public_dir))
        .fallback_service(ServeDir::new(&public_dir))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

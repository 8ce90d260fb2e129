//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Outcome label for a successful conversion.
pub const OUTCOME_SUCCESS: &str = "success";

/// Outcome label for a failed conversion.
pub const OUTCOME_FAILURE: &str = "failure";

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "gifcast_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "gifcast_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "gifcast_http_requests_in_flight";

    // WebSocket metrics
    pub const WS_CONNECTIONS_TOTAL: &str = "gifcast_ws_connections_total";
    pub const WS_CONNECTIONS_ACTIVE: &str = "gifcast_ws_connections_active";
    pub const WS_MESSAGES_SENT: &str = "gifcast_ws_messages_sent_total";

    // Conversion metrics
    pub const CONVERSIONS_STARTED_TOTAL: &str = "gifcast_conversions_started_total";
    pub const CONVERSIONS_FINISHED_TOTAL: &str = "gifcast_conversions_finished_total";
    pub const CONVERSION_DURATION_SECONDS: &str = "gifcast_conversion_duration_seconds";
    pub const CONVERSIONS_IN_FLIGHT: &str = "gifcast_conversions_in_flight";
    pub const UPLOAD_BYTES_TOTAL: &str = "gifcast_upload_bytes_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record WebSocket connection.
pub fn record_ws_connection(scoped: bool) {
    let labels = [("scoped", scoped.to_string())];
    counter!(names::WS_CONNECTIONS_TOTAL, &labels).increment(1);
}

/// Update active WebSocket connections gauge.
pub fn set_ws_active_connections(count: i64) {
    gauge!(names::WS_CONNECTIONS_ACTIVE).set(count as f64);
}

/// Record WebSocket message sent.
pub fn record_ws_message_sent(message_type: &str) {
    let labels = [("type", message_type.to_string())];
    counter!(names::WS_MESSAGES_SENT, &labels).increment(1);
}

/// Record a conversion start.
pub fn record_conversion_started() {
    counter!(names::CONVERSIONS_STARTED_TOTAL).increment(1);
    gauge!(names::CONVERSIONS_IN_FLIGHT).increment(1.0);
}

/// Record a conversion end with its outcome.
pub fn record_conversion_finished(outcome: &'static str, duration_secs: f64) {
    let labels = [("outcome", outcome)];
    counter!(names::CONVERSIONS_FINISHED_TOTAL, &labels).increment(1);
    histogram!(names::CONVERSION_DURATION_SECONDS, &labels).record(duration_secs);
    gauge!(names::CONVERSIONS_IN_FLIGHT).decrement(1.0);
}

/// Record bytes accepted from an upload.
pub fn record_upload_bytes(bytes: u64) {
    counter!(names::UPLOAD_BYTES_TOTAL).increment(bytes);
}

/// Collapse static file paths so labels stay bounded.
fn sanitize_path(path: &str) -> String {
    match path {
        "/" | "/convert" | "/ws" | "/health" | "/healthz" | "/metrics" => path.to_string(),
        p if p.starts_with("/public/") => "/public/:file".to_string(),
        _ => "/:file".to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/convert"), "/convert");
        assert_eq!(sanitize_path("/public/1700000000000.gif"), "/public/:file");
        assert_eq!(sanitize_path("/client/app.js"), "/:file");
    }
}

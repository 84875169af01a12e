//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {e}"))
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "ytperf_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "ytperf_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "ytperf_http_requests_in_flight";

    // Prediction metrics
    pub const PREDICTIONS_TOTAL: &str = "ytperf_predictions_total";
    pub const PREDICTION_FALLBACKS_TOTAL: &str = "ytperf_prediction_fallbacks_total";
    pub const PREDICTION_DURATION_SECONDS: &str = "ytperf_prediction_duration_seconds";

    // Artifact metrics
    pub const ARTIFACT_RELOADS_TOTAL: &str = "ytperf_artifact_reloads_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a completed prediction and which pipeline stages fell back.
pub fn record_prediction(genre: &str, duration_secs: f64) {
    let labels = [("genre", genre.to_string())];
    counter!(names::PREDICTIONS_TOTAL, &labels).increment(1);
    histogram!(names::PREDICTION_DURATION_SECONDS).record(duration_secs);
}

/// Record a pipeline stage that produced a fallback value.
pub fn record_prediction_fallback(stage: &str) {
    let labels = [("stage", stage.to_string())];
    counter!(names::PREDICTION_FALLBACKS_TOTAL, &labels).increment(1);
}

/// Record an artifact reload.
pub fn record_artifact_reload(success: bool) {
    let labels = [("success", success.to_string())];
    counter!(names::ARTIFACT_RELOADS_TOTAL, &labels).increment(1);
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

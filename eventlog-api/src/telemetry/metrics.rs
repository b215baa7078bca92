//! Prometheus Metrics Definitions
//!
//! Defines the event log metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once on first use
pub static METRICS: Lazy<ApiResult<EventLogMetrics>> = Lazy::new(EventLogMetrics::new);

/// Container for all event log metrics.
#[derive(Clone)]
pub struct EventLogMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Events persisted through POST - labels: event_type
    pub events_logged_total: CounterVec,

    /// Storage gateway failures - labels: operation
    pub storage_failures_total: CounterVec,
}

impl EventLogMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "eventlog_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "eventlog_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            events_logged_total: register_counter_vec!(
                "eventlog_events_logged_total",
                "Total number of events persisted",
                &["event_type"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register events_logged_total: {}", e)))?,

            storage_failures_total: register_counter_vec!(
                "eventlog_storage_failures_total",
                "Total number of storage gateway failures",
                &["operation"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register storage_failures_total: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a persisted event.
    pub fn record_event_logged(&self, event_type: &str) {
        self.events_logged_total
            .with_label_values(&[event_type])
            .inc();
    }

    /// Record a storage gateway failure.
    pub fn record_storage_failure(&self, operation: &str) {
        self.storage_failures_total
            .with_label_values(&[operation])
            .inc();
    }
}

/// Run `record` against the global metrics, skipping it if registration failed.
pub fn with_metrics(record: impl FnOnce(&EventLogMetrics)) {
    match METRICS.as_ref() {
        Ok(metrics) => record(metrics),
        Err(e) => tracing::debug!(error = %e, "Metrics unavailable"),
    }
}

/// Record a storage gateway failure on the global metrics.
pub fn record_storage_failure(operation: &str) {
    with_metrics(|metrics| metrics.record_storage_failure(operation));
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Make sure our collectors exist even before the first request is recorded.
    Lazy::force(&METRICS);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in an `info_span!`, records the Prometheus request
//! counter and latency histogram, and logs a completion line.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info_span, Instrument};

use super::metrics::with_metrics;

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("Invalid UUID regex")
});

/// Normalize path for metrics/spans (replace UUIDs with `{id}`).
///
/// Keeps the Prometheus label cardinality bounded by the route table.
pub fn normalize_path(path: &str) -> String {
    UUID_SEGMENT.replace_all(path, "{id}").into_owned()
}

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    with_metrics(|metrics| {
        metrics.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        )
    });

    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

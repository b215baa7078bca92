//! REST API Routes Module
//!
//! Includes:
//! - Event routes under /api/v1/event
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics and the OpenAPI document
//! - The legacy `GET /event` placeholder
//! - CORS support for browser-based clients

pub mod event;
pub mod health;
pub mod legacy;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use eventlog_storage::StorageGateway;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::services::EventLogService;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use event::create_router as event_router;
pub use health::create_router as health_router;
pub use legacy::create_router as legacy_router;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        // Development mode: allow all origins
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        cors.allow_origin(origins)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// - Event routes under /api/v1/*
/// - Health checks at /health/*
/// - Metrics at /metrics (unless disabled)
/// - OpenAPI spec at /openapi.json
/// - Legacy placeholder at /event
///
/// Every request goes through CORS, the observability middleware and the
/// request timeout. Bodies above `max_body_bytes` are rejected with 413.
pub fn create_api_router(
    service: Arc<EventLogService>,
    gateway: StorageGateway,
    config: &ApiConfig,
) -> Router {
    let mut router = Router::new()
        .nest("/api/v1", event::create_router(service))
        .nest("/health", health::create_router(gateway))
        .merge(legacy::create_router())
        .route("/openapi.json", get(openapi_json));

    if config.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(config))
}

//! Health Check Endpoints
//!
//! - /health/ping - constant "pong"
//! - /health/live - version and uptime, always 200 while the process serves
//! - /health/ready - one storage gateway health check; 503 when it fails

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use eventlog_core::StorageOperation;
use eventlog_storage::StorageGateway;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::telemetry::record_storage_failure;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Body of /health/live.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LiveReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Outcome of a single gateway check.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StorageCheck {
    pub status: HealthStatus,
    /// Gateway operation that was exercised.
    pub operation: String,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of /health/ready.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ReadyReport {
    pub status: HealthStatus,
    pub storage: StorageCheck,
}

// ============================================================================
// STATE
// ============================================================================

pub struct HealthState {
    gateway: StorageGateway,
    started: Instant,
}

/// Run the gateway health check once and time it.
pub async fn check_storage(gateway: &StorageGateway) -> StorageCheck {
    let operation = StorageOperation::HealthCheck;
    let start = Instant::now();
    let outcome = gateway.health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => StorageCheck {
            status: HealthStatus::Healthy,
            operation: operation.to_string(),
            latency_ms,
            error: None,
        },
        Err(e) => {
            record_storage_failure(e.operation.as_str());
            StorageCheck {
                status: HealthStatus::Unhealthy,
                operation: e.operation.to_string(),
                latency_ms,
                error: Some(e.cause.to_string()),
            }
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is serving requests", body = LiveReport),
    ),
)]
pub async fn liveness(State(state): State<Arc<HealthState>>) -> Json<LiveReport> {
    Json(LiveReport {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

/// GET /health/ready - storage reachability through the gateway
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Storage answered the health check", body = ReadyReport),
        (status = 503, description = "Storage health check failed", body = ReadyReport),
    ),
)]
pub async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let storage = check_storage(&state.gateway).await;
    let status = storage.status;
    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(ReadyReport { status, storage }))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router
pub fn create_router(gateway: StorageGateway) -> Router {
    let state = Arc::new(HealthState {
        gateway,
        started: Instant::now(),
    });

    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventlog_storage::InMemoryEventRepository;
    use eventlog_test_utils::FailingEventRepository;

    #[tokio::test]
    async fn test_check_of_working_storage_is_healthy() {
        let gateway = StorageGateway::new(Arc::new(InMemoryEventRepository::new()));

        let check = check_storage(&gateway).await;

        assert_eq!(check.status, HealthStatus::Healthy);
        assert_eq!(check.operation, "health_check");
        assert!(check.error.is_none());
    }

    #[tokio::test]
    async fn test_check_of_failing_storage_reports_cause() {
        let gateway = StorageGateway::new(Arc::new(FailingEventRepository::connection_refused()));

        let check = check_storage(&gateway).await;

        assert_eq!(check.status, HealthStatus::Unhealthy);
        assert_eq!(check.operation, StorageOperation::HealthCheck.as_str());
        assert_eq!(
            check.error.as_deref(),
            Some("Connection failure: connection refused")
        );
    }

    #[test]
    fn test_healthy_check_omits_error() -> Result<(), serde_json::Error> {
        let report = ReadyReport {
            status: HealthStatus::Healthy,
            storage: StorageCheck {
                status: HealthStatus::Healthy,
                operation: "health_check".to_string(),
                latency_ms: 2,
                error: None,
            },
        };

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["storage"]["latency_ms"], 2);
        assert!(json["storage"].get("error").is_none());
        Ok(())
    }
}

//! Event Log API Server Entry Point
//!
//! Bootstraps configuration, wires repository, gateway, service and router
//! together, and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use eventlog_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, DbConfig, EventLogService,
    PgEventRepository, StorageBackend,
};
use eventlog_storage::{EventRepository, InMemoryEventRepository, StorageGateway};

use eventlog_api::telemetry::{init_tracing, TelemetryConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let repository = build_repository(api_config.storage).await?;

    let gateway = StorageGateway::new(repository);
    let service = Arc::new(EventLogService::new(gateway.clone()));
    let app: Router = create_api_router(service, gateway, &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, storage = ?api_config.storage, "Starting event log API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_repository(backend: StorageBackend) -> ApiResult<Arc<dyn EventRepository>> {
    match backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryEventRepository::new())),
        StorageBackend::Postgres => {
            let db_config = DbConfig::from_env();
            tracing::info!(
                host = %db_config.host,
                port = db_config.port,
                dbname = %db_config.dbname,
                "Connecting to PostgreSQL"
            );
            let repository = PgEventRepository::from_config(&db_config)?;
            repository.migrate().await.map_err(|e| {
                ApiError::internal_error(format!("Failed to prepare event schema: {}", e))
            })?;
            Ok(Arc::new(repository))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("EVENTLOG_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("EVENTLOG_API_PORT").ok())
        .unwrap_or_else(|| "8080".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::internal_error(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::internal_error(format!("Invalid bind address {}: {}", addr, e)))
}

//! Event Log API - REST Layer
//!
//! Exposes the event log over HTTP with Axum: record an event, fetch it by
//! id, and list a user's events. Handlers talk to `EventLogService`, which
//! delegates to the `StorageGateway` from `eventlog-storage`. Storage is the
//! in-memory engine or PostgreSQL through `PgEventRepository`.

pub mod config;
pub mod db;
pub mod decode;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ApiConfig, StorageBackend};
pub use db::{DbConfig, PgEventRepository};
pub use decode::decode_event;
pub use error::{ApiError, ApiResult, ErrorBody, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::EventLogService;

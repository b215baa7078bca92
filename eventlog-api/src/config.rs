//! API Configuration Module
//!
//! Configuration for CORS, request limits, metrics and the storage backend.
//! Loaded from environment variables with sensible defaults for development.

use std::str::FromStr;
use std::time::Duration;

/// Default request body limit for event submissions (64 KiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// STORAGE BACKEND
// ============================================================================

/// Which `EventRepository` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local map, lost on restart.
    #[default]
    Memory,
    /// PostgreSQL through a deadpool connection pool.
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, limits and production hardening.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Upper bound on handling a single request, storage calls included.
    pub request_timeout: Duration,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Whether `/metrics` is mounted. Metrics are recorded either way.
    pub metrics_enabled: bool,

    /// Storage backend selection.
    pub storage: StorageBackend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: 86400, // 24 hours
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            metrics_enabled: true,
            storage: StorageBackend::Memory,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `EVENTLOG_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `EVENTLOG_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `EVENTLOG_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 30)
    /// - `EVENTLOG_MAX_BODY_BYTES`: Request body limit (default: 65536)
    /// - `EVENTLOG_METRICS_ENABLED`: "true"/"1" or "false"/"0" (default: true)
    /// - `EVENTLOG_STORAGE`: "memory" or "postgres" (default: memory)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("EVENTLOG_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("EVENTLOG_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let request_timeout = std::env::var("EVENTLOG_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let max_body_bytes = std::env::var("EVENTLOG_MAX_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_body_bytes);

        let metrics_enabled = std::env::var("EVENTLOG_METRICS_ENABLED")
            .ok()
            .map(|s| !matches!(s.trim().to_ascii_lowercase().as_str(), "false" | "0"))
            .unwrap_or(defaults.metrics_enabled);

        let storage = match std::env::var("EVENTLOG_STORAGE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "Falling back to in-memory storage");
                StorageBackend::Memory
            }),
            Err(_) => defaults.storage,
        };

        Self {
            cors_origins,
            cors_max_age_secs,
            request_timeout,
            max_body_bytes,
            metrics_enabled,
            storage,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

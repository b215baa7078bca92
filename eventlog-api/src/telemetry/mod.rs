//! Event Log Telemetry - Observability Infrastructure
//!
//! Provides structured logging and Prometheus metrics for the API layer.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics_handler, record_storage_failure, with_metrics, EventLogMetrics, METRICS};
pub use middleware::{normalize_path, observability_middleware};
pub use tracer::{init_tracing, LogFormat, TelemetryConfig, DEFAULT_LOG_FILTER};

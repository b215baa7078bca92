//! OpenAPI Specification for the Event Log API
//!
//! Generated with utoipa from the route annotations and schema derives.

use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::routes::{event, health, legacy};
use crate::telemetry::metrics;
use eventlog_core::{EventPayload, EventType};

/// OpenAPI document for the Event Log API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Log API",
        version = "0.1.0",
        description = "Records user lifecycle events and serves them back by event id or user id",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    tags(
        (name = "Events", description = "Record and query user lifecycle events"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics"),
        (name = "Legacy", description = "Pre-v1 placeholder routes"),
    ),
    paths(
        event::create_event,
        event::get_event,
        event::get_events_for_user,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
        legacy::legacy_event,
    ),
    components(
        schemas(
            EventPayload,
            EventType,
            ErrorBody,
            health::HealthStatus,
            health::LiveReport,
            health::ReadyReport,
            health::StorageCheck,
        )
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Event Log API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 4);

        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.schemas.contains_key("Event"));
        assert!(components.schemas.contains_key("EventType"));
        assert!(components.schemas.contains_key("ErrorBody"));
        Ok(())
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi())
            .map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;

        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;

        assert!(json.contains("Event Log API"));
        assert!(json.contains("USER_UPDATED_REGISTRATION_INFO"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        assert!(paths.contains_key("/api/v1/event"));
        assert!(paths.contains_key("/api/v1/event/{event_id}"));
        assert!(paths.contains_key("/api/v1/event/user/{user_id}"));
        assert!(paths.contains_key("/health/ready"));
        assert!(paths.contains_key("/metrics"));
        assert!(paths.contains_key("/event"));
    }
}

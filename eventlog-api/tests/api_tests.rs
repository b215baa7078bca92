//! HTTP scenario tests for the event log API, driven in-process.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use eventlog_api::telemetry::METRICS;
use eventlog_api::ApiConfig;
use eventlog_core::{Event, EventType};
use eventlog_storage::{EventRepository, RepositoryResult};
use eventlog_test_utils::{fixtures, FailingEventRepository};
use serde_json::json;
use uuid::Uuid;

#[path = "support/app.rs"]
mod app_support;
use app_support::{get, post_json, post_with_content_type, send, test_app, test_app_with};

const EVENTS: &str = "/api/v1/event";

fn valid_body() -> serde_json::Value {
    fixtures::event_json(&fixtures::registration_event())
}

// ============================================================================
// POST /api/v1/event - DECODING
// ============================================================================

#[tokio::test]
async fn test_post_empty_object_reports_missing_field() -> Result<(), String> {
    let (app, _) = test_app();

    let response = send(&app, post_json(EVENTS, "{}")?).await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    let message = response.error_message()?;
    assert!(message.contains("Missing JSON field"), "got {:?}", message);
    assert_eq!(message, "Missing JSON field: eventId");
    Ok(())
}

#[tokio::test]
async fn test_post_invalid_event_id() -> Result<(), String> {
    let (app, _) = test_app();
    let mut body = valid_body();
    body["eventId"] = json!("1234");

    let response = send(&app, post_json(EVENTS, body.to_string())?).await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message()?, "Invalid UUID format.");
    Ok(())
}

#[tokio::test]
async fn test_post_unknown_event_type() -> Result<(), String> {
    let (app, _) = test_app();
    let mut body = valid_body();
    body["eventType"] = json!("SOME_OTHER_ENUM");

    let response = send(&app, post_json(EVENTS, body.to_string())?).await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let message = response.error_message()?;
    assert!(message.starts_with("Invalid eventType."), "got {:?}", message);
    assert!(message.contains("USER_UPDATED_REGISTRATION_INFO"));
    Ok(())
}

#[tokio::test]
async fn test_post_malformed_time() -> Result<(), String> {
    let (app, _) = test_app();
    let mut body = valid_body();
    body["time"] = json!("2020-102-340T123:45 ");

    let response = send(&app, post_json(EVENTS, body.to_string())?).await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let message = response.error_message()?;
    assert!(message.starts_with("Invalid Date-Time format submitted."), "got {:?}", message);
    Ok(())
}

#[tokio::test]
async fn test_post_syntax_error_is_generic() -> Result<(), String> {
    let (app, repository) = test_app();

    let response = send(&app, post_json(EVENTS, "{\"eventId\": ")?).await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message()?, "Invalid JSON received");
    assert!(repository.is_empty().map_err(|e| e.to_string())?);
    Ok(())
}

#[tokio::test]
async fn test_post_requires_json_content_type() -> Result<(), String> {
    let (app, repository) = test_app();

    let response = send(
        &app,
        post_with_content_type(EVENTS, "text/plain", valid_body().to_string())?,
    )
    .await?;

    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        response.error_message()?,
        "Content type must be application/json"
    );
    assert!(repository.is_empty().map_err(|e| e.to_string())?);
    Ok(())
}

#[tokio::test]
async fn test_post_accepts_charset_parameter() -> Result<(), String> {
    let (app, _) = test_app();

    let response = send(
        &app,
        post_with_content_type(
            EVENTS,
            "application/json; charset=utf-8",
            valid_body().to_string(),
        )?,
    )
    .await?;

    assert_eq!(response.status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn test_post_oversized_body_is_rejected() -> Result<(), String> {
    let config = ApiConfig {
        max_body_bytes: 64,
        ..ApiConfig::default()
    };
    let app = test_app_with(Arc::new(eventlog_storage::InMemoryEventRepository::new()), &config);

    let mut body = valid_body();
    body["comment"] = json!("x".repeat(256));
    let response = send(&app, post_json(EVENTS, body.to_string())?).await?;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_message()?, "Request body too large");
    Ok(())
}

// ============================================================================
// POST / GET ROUND TRIPS
// ============================================================================

#[tokio::test]
async fn test_post_then_get_returns_same_event() -> Result<(), String> {
    let (app, repository) = test_app();
    let event = fixtures::random_event(EventType::UserDeactivated, "2021-06-30T23:59:59.5");
    let body = fixtures::event_json(&event);

    let created = send(&app, post_json(EVENTS, body.to_string())?).await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.json()?, body);
    assert_eq!(repository.len().map_err(|e| e.to_string())?, 1);

    let fetched = send(&app, get(&format!("{}/{}", EVENTS, event.event_id()))?).await?;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()?, body);
    Ok(())
}

#[tokio::test]
async fn test_post_normalizes_time_format() -> Result<(), String> {
    let (app, _) = test_app();
    let mut body = valid_body();
    body["time"] = json!("2020-01-01T12:00:00.000");

    let created = send(&app, post_json(EVENTS, body.to_string())?).await?;

    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.json()?["time"], json!("2020-01-01T12:00"));
    Ok(())
}

#[tokio::test]
async fn test_second_post_with_same_id_overwrites() -> Result<(), String> {
    let (app, repository) = test_app();
    let first = fixtures::registration_event();
    let second = first
        .clone()
        .with_event_type(EventType::UserUpdatedRegistrationInfo)
        .with_time(fixtures::timestamp("2020-02-02T08:30"));

    for event in [&first, &second] {
        let response = send(&app, post_json(EVENTS, fixtures::event_json(event).to_string())?).await?;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    assert_eq!(repository.len().map_err(|e| e.to_string())?, 1);
    let fetched = send(&app, get(&format!("{}/{}", EVENTS, first.event_id()))?).await?;
    assert_eq!(fetched.json()?, fixtures::event_json(&second));
    Ok(())
}

#[tokio::test]
async fn test_get_unknown_event_is_empty_404() -> Result<(), String> {
    let (app, _) = test_app();

    let response = send(&app, get(&format!("{}/{}", EVENTS, Uuid::new_v4()))?).await?;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_get_with_malformed_id_is_bad_request() -> Result<(), String> {
    let (app, _) = test_app();

    let response = send(&app, get(&format!("{}/1234", EVENTS))?).await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message()?, "Invalid UUID format.");
    Ok(())
}

#[tokio::test]
async fn test_user_events_are_ordered_by_time() -> Result<(), String> {
    let (app, _) = test_app();
    let user_id = Uuid::new_v4();
    let later = fixtures::event_for_user(user_id, EventType::UserDeleted, "2022-03-01T00:00");
    let earlier = fixtures::event_for_user(user_id, EventType::UserRegistration, "2022-01-01T00:00");
    let stranger = fixtures::random_event(EventType::UserRegistration, "2022-02-01T00:00");

    for event in [&later, &earlier, &stranger] {
        let response = send(&app, post_json(EVENTS, fixtures::event_json(event).to_string())?).await?;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = send(&app, get(&format!("{}/user/{}", EVENTS, user_id))?).await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()?,
        json!([fixtures::event_json(&earlier), fixtures::event_json(&later)])
    );
    Ok(())
}

#[tokio::test]
async fn test_user_without_events_gets_empty_list() -> Result<(), String> {
    let (app, _) = test_app();

    let response = send(&app, get(&format!("{}/user/{}", EVENTS, Uuid::new_v4()))?).await?;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()?, json!([]));
    Ok(())
}

// ============================================================================
// STORAGE FAILURES AND TIMEOUTS
// ============================================================================

#[tokio::test]
async fn test_storage_failures_are_internal_errors() -> Result<(), String> {
    let app = test_app_with(
        Arc::new(FailingEventRepository::connection_refused()),
        &ApiConfig::default(),
    );

    let requests = [
        post_json(EVENTS, valid_body().to_string())?,
        get(&format!("{}/{}", EVENTS, Uuid::new_v4()))?,
        get(&format!("{}/user/{}", EVENTS, Uuid::new_v4()))?,
    ];

    for request in requests {
        let response = send(&app, request).await?;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error_message()?, "Internal Server Error");
        assert!(!response.text().contains("connection refused"));
    }
    Ok(())
}

/// Engine that never answers within a test's patience.
struct StalledRepository;

#[async_trait]
impl EventRepository for StalledRepository {
    async fn save(&self, event: &Event) -> RepositoryResult<Event> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(event.clone())
    }

    async fn find_by_id(&self, _event_id: Uuid) -> RepositoryResult<Option<Event>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }

    async fn find_all_by_user_id(&self, _user_id: Uuid) -> RepositoryResult<Vec<Event>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_slow_storage_times_out() -> Result<(), String> {
    let config = ApiConfig {
        request_timeout: Duration::from_millis(50),
        ..ApiConfig::default()
    };
    let app = test_app_with(Arc::new(StalledRepository), &config);

    let response = send(&app, get(&format!("{}/{}", EVENTS, Uuid::new_v4()))?).await?;

    assert_eq!(response.status, StatusCode::REQUEST_TIMEOUT);
    Ok(())
}

// ============================================================================
// AMBIENT ENDPOINTS
// ============================================================================

#[tokio::test]
async fn test_legacy_event_route_is_empty_ok() -> Result<(), String> {
    let (app, _) = test_app();

    let response = send(&app, get("/event")?).await?;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unmapped_route_is_404() -> Result<(), String> {
    let (app, _) = test_app();

    let response = send(&app, get("/api/v2/event")?).await?;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_health_endpoints() -> Result<(), String> {
    let (app, _) = test_app();

    let ping = send(&app, get("/health/ping")?).await?;
    assert_eq!(ping.status, StatusCode::OK);
    assert_eq!(ping.text(), "pong");

    let live = send(&app, get("/health/live")?).await?;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.json()?["version"], json!(env!("CARGO_PKG_VERSION")));

    let ready = send(&app, get("/health/ready")?).await?;
    assert_eq!(ready.status, StatusCode::OK);
    let body = ready.json()?;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["storage"]["operation"], json!("health_check"));
    Ok(())
}

#[tokio::test]
async fn test_readiness_reports_unhealthy_storage() -> Result<(), String> {
    let app = test_app_with(Arc::new(FailingEventRepository::default()), &ApiConfig::default());

    let ready = send(&app, get("/health/ready")?).await?;

    assert_eq!(ready.status, StatusCode::SERVICE_UNAVAILABLE);
    let body = ready.json()?;
    assert_eq!(body["status"], json!("unhealthy"));
    assert_eq!(body["storage"]["status"], json!("unhealthy"));
    assert_eq!(body["storage"]["error"], json!("Connection failure: connection refused"));
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_follows_config() -> Result<(), String> {
    let (app, _) = test_app();
    send(&app, post_json(EVENTS, valid_body().to_string())?).await?;

    let metrics = send(&app, get("/metrics")?).await?;
    assert_eq!(metrics.status, StatusCode::OK);
    assert!(metrics.text().contains("eventlog_events_logged_total"));

    let config = ApiConfig {
        metrics_enabled: false,
        ..ApiConfig::default()
    };
    let app = test_app_with(Arc::new(eventlog_storage::InMemoryEventRepository::new()), &config);
    let metrics = send(&app, get("/metrics")?).await?;
    assert_eq!(metrics.status, StatusCode::NOT_FOUND);

    // Unmounting the route does not stop recording.
    let before = deleted_events_logged()?;
    let deleted = fixtures::random_event(EventType::UserDeleted, "2020-05-05T05:05");
    let created = send(&app, post_json(EVENTS, fixtures::event_json(&deleted).to_string())?).await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert!(deleted_events_logged()? >= before + 1.0);
    Ok(())
}

fn deleted_events_logged() -> Result<f64, String> {
    let metrics = METRICS.as_ref().map_err(|e| e.message.clone())?;
    Ok(metrics
        .events_logged_total
        .with_label_values(&["USER_DELETED"])
        .get())
}

#[tokio::test]
async fn test_openapi_document_is_served() -> Result<(), String> {
    let (app, _) = test_app();

    let response = send(&app, get("/openapi.json")?).await?;

    assert_eq!(response.status, StatusCode::OK);
    let document = response.json()?;
    assert!(document["paths"].get("/api/v1/event").is_some());
    Ok(())
}

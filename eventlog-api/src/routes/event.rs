//! Event REST API Routes
//!
//! Record an event, fetch one by id, and list a user's events.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use eventlog_core::EventPayload;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult, ErrorBody},
    extractors::{EventJson, PathId},
    services::EventLogService,
    telemetry::with_metrics,
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/event - Record an event
///
/// An existing record with the same `eventId` is overwritten.
#[utoipa::path(
    post,
    path = "/api/v1/event",
    tag = "Events",
    request_body = EventPayload,
    responses(
        (status = 201, description = "Event recorded", body = EventPayload),
        (status = 400, description = "Malformed event submission", body = ErrorBody),
        (status = 413, description = "Request body too large", body = ErrorBody),
        (status = 415, description = "Body is not JSON", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
)]
pub async fn create_event(
    State(service): State<Arc<EventLogService>>,
    EventJson(event): EventJson,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(%event, "Received event");

    let logged = service.log_event(event).await?;
    with_metrics(|metrics| metrics.record_event_logged(logged.event_type().as_str()));

    Ok((StatusCode::CREATED, Json(EventPayload::from(logged))))
}

/// GET /api/v1/event/{event_id} - Fetch an event by id
#[utoipa::path(
    get,
    path = "/api/v1/event/{event_id}",
    tag = "Events",
    params(
        ("event_id" = uuid::Uuid, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event found", body = EventPayload),
        (status = 400, description = "Malformed event id", body = ErrorBody),
        (status = 404, description = "No event with this id"),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
)]
pub async fn get_event(
    State(service): State<Arc<EventLogService>>,
    PathId(event_id): PathId,
) -> ApiResult<Json<EventPayload>> {
    tracing::info!(%event_id, "Received event lookup");

    service
        .get_event_by_id(event_id)
        .await?
        .map(|event| Json(EventPayload::from(event)))
        .ok_or_else(|| ApiError::event_not_found(event_id))
}

/// GET /api/v1/event/user/{user_id} - List a user's events
///
/// Events are ordered by time, then id. A user with no events gets `[]`.
#[utoipa::path(
    get,
    path = "/api/v1/event/user/{user_id}",
    tag = "Events",
    params(
        ("user_id" = uuid::Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Events recorded for the user", body = Vec<EventPayload>),
        (status = 400, description = "Malformed user id", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
)]
pub async fn get_events_for_user(
    State(service): State<Arc<EventLogService>>,
    PathId(user_id): PathId,
) -> ApiResult<Json<Vec<EventPayload>>> {
    tracing::info!(%user_id, "Received user event lookup");

    let events = service.get_events_for_user(user_id).await?;
    Ok(Json(events.into_iter().map(EventPayload::from).collect()))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the event router, mounted under `/api/v1`.
pub fn create_router(service: Arc<EventLogService>) -> Router {
    Router::new()
        .route("/event", post(create_event))
        .route("/event/:event_id", get(get_event))
        .route("/event/user/:user_id", get(get_events_for_user))
        .with_state(service)
}

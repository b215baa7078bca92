//! Pre-v1 placeholder route kept for old clients.

use axum::{http::StatusCode, routing::get, Router};

/// GET /event - Legacy placeholder, always 200 with an empty body
#[utoipa::path(
    get,
    path = "/event",
    tag = "Legacy",
    responses(
        (status = 200, description = "Empty response"),
    ),
)]
pub async fn legacy_event() -> StatusCode {
    StatusCode::OK
}

pub fn create_router() -> Router {
    Router::new().route("/event", get(legacy_event))
}

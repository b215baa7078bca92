//! Request body extractor for event submissions.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use eventlog_core::{Event, ValidationError};

use crate::decode::decode_event;
use crate::error::ApiError;

/// Extracts and validates an [`Event`] from a JSON request body.
///
/// Unlike `axum::Json<Event>`, rejections carry the classified
/// `{"error": "<message>"}` body produced by [`decode_event`].
#[derive(Debug, Clone)]
pub struct EventJson(pub Event);

#[async_trait]
impl<S> FromRequest<S> for EventJson
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(ApiError::unsupported_media_type());
        }

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large()
            } else {
                tracing::error!(error = %rejection, "Unrecognised JSON error: failed to read body");
                ApiError::from(ValidationError::InvalidJson)
            }
        })?;

        decode_event(&body).map(EventJson).map_err(ApiError::from)
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

//! Path extractor for UUID identifiers.
//!
//! Provides `PathId`, which rejects non-UUID path segments with the same
//! `{"error": "Invalid UUID format."}` body the event decoder uses.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use eventlog_core::ValidationError;
use uuid::Uuid;

use crate::decode::parse_hyphenated_uuid;
use crate::error::ApiError;

/// Extractor for a single UUID path parameter.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_event(PathId(event_id): PathId) -> ApiResult<Json<Event>> {
///     // event_id is a parsed Uuid
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::error!(path = %parts.uri.path(), error = %e, "Failed to extract path parameter");
                ApiError::internal_error("Failed to extract path parameter")
            })?;

        parse_hyphenated_uuid(&raw)
            .map(PathId)
            .ok_or_else(|| ApiError::from(ValidationError::InvalidUuid))
    }
}

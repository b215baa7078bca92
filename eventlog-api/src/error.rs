//! Error Types for the Event Log API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct carrying a code and client-facing message
//! - ErrorCode enum mapping each category to an HTTP status
//! - IntoResponse implementation producing `{"error": "<message>"}` bodies
//!
//! Not-found responses carry no body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eventlog_core::{StorageError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Client Errors (400, 404, 413, 415)
    // ========================================================================
    /// Request body or path parameter failed validation
    ValidationFailed,

    /// Requested event does not exist
    EventNotFound,

    /// Request body exceeds the configured limit
    PayloadTooLarge,

    /// Request body is not declared as JSON
    UnsupportedMediaType,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Storage gateway reported a failure
    StorageFailure,

    /// Internal server error
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::EventNotFound => StatusCode::NOT_FOUND,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorCode::StorageFailure | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Invalid JSON received",
            ErrorCode::EventNotFound => "Event not found",
            ErrorCode::PayloadTooLarge => "Request body too large",
            ErrorCode::UnsupportedMediaType => "Content type must be application/json",
            ErrorCode::StorageFailure | ErrorCode::InternalError => "Internal Server Error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Error returned by every API handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Client-facing message placed in the `error` field of the body
    pub message: String,
}

/// JSON body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a ValidationFailed error from a decoding failure.
    pub fn validation(err: &ValidationError) -> Self {
        Self::new(ErrorCode::ValidationFailed, err.to_string())
    }

    /// Create an EventNotFound error.
    pub fn event_not_found(event_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EventNotFound,
            format!("Event {} not found", event_id),
        )
    }

    /// Create a PayloadTooLarge error.
    pub fn payload_too_large() -> Self {
        Self::from_code(ErrorCode::PayloadTooLarge)
    }

    /// Create an UnsupportedMediaType error.
    pub fn unsupported_media_type() -> Self {
        Self::from_code(ErrorCode::UnsupportedMediaType)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Allows ApiError to be returned directly from Axum handlers.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.code == ErrorCode::EventNotFound {
            return status.into_response();
        }
        let body = Json(ErrorBody {
            error: self.message,
        });
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(&err)
    }
}

/// Storage failures become a generic 500; the cause is only logged.
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(operation = %err.operation, error = %err.cause, "Storage failure");
        crate::telemetry::record_storage_failure(err.operation.as_str());
        ApiError::from_code(ErrorCode::StorageFailure)
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use eventlog_core::{RepositoryError, StorageOperation};

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EventNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ErrorCode::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(ErrorCode::StorageFailure.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::ServiceUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_error_conversion_keeps_message() {
        let err = ApiError::from(ValidationError::InvalidUuid);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Invalid UUID format.");
    }

    #[test]
    fn test_storage_error_conversion_hides_cause() {
        let err = ApiError::from(StorageError::new(
            StorageOperation::Save,
            RepositoryError::Connection {
                reason: "secret host unreachable".to_string(),
            },
        ));
        assert_eq!(err.code, ErrorCode::StorageFailure);
        assert!(!err.message.contains("secret"));
    }

    #[tokio::test]
    async fn test_validation_response_body_shape() -> Result<(), serde_json::Error> {
        let response = ApiError::from(ValidationError::missing_field("time")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await)?;
        assert_eq!(body, serde_json::json!({"error": "Missing JSON field: time"}));
        Ok(())
    }

    #[tokio::test]
    async fn test_not_found_response_has_empty_body() {
        let response = ApiError::event_not_found("abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::internal_error("Failed to bind");
        let display = format!("{}", err);
        assert!(display.contains("InternalError"));
        assert!(display.contains("Failed to bind"));
    }
}

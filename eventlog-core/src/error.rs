//! Error types for event log operations

use std::fmt;
use thiserror::Error;

/// Client input errors raised while decoding an event submission.
///
/// The `Display` text of each variant is the exact message returned to the
/// client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing JSON field: {field}")]
    MissingField { field: String },

    #[error("Invalid eventType. Choose one of USER_REGISTRATION, USER_DELETED, USER_DEACTIVATED, USER_UPDATED_REGISTRATION_INFO.")]
    InvalidEventType,

    #[error("Invalid UUID format.")]
    InvalidUuid,

    #[error("Invalid Date-Time format submitted. Please use 2000-01-01T12:00 instead.")]
    InvalidDateTime,

    #[error("Invalid JSON received")]
    InvalidJson,
}

impl ValidationError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        ValidationError::MissingField {
            field: field.into(),
        }
    }
}

/// Failures reported by a storage engine, before normalization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Connection failure: {reason}")]
    Connection { reason: String },

    #[error("Constraint violation on {constraint}: {reason}")]
    ConstraintViolation { constraint: String, reason: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Query failed: {reason}")]
    Query { reason: String },

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Storage gateway operation that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOperation {
    Save,
    FindById,
    FindAllByUserId,
    HealthCheck,
}

impl StorageOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageOperation::Save => "save",
            StorageOperation::FindById => "find_by_id",
            StorageOperation::FindAllByUserId => "find_all_by_user_id",
            StorageOperation::HealthCheck => "health_check",
        }
    }
}

impl fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single internal error kind surfaced by the storage gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Storage operation {operation} failed: {cause}")]
pub struct StorageError {
    pub operation: StorageOperation,
    #[source]
    pub cause: RepositoryError,
}

impl StorageError {
    pub fn new(operation: StorageOperation, cause: RepositoryError) -> Self {
        Self { operation, cause }
    }
}

/// Result type alias for storage gateway operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// TESTS
// =============================================================================

//! Event Log Core - Entity Types
//!
//! Data structures shared by every layer of the event log service: the
//! `Event` record and its derived content hash, the `EventType` enum, the
//! local timestamp wire format, and the error vocabulary.

pub mod enums;
pub mod error;
pub mod event;
pub mod time;

pub use enums::{EventType, EventTypeParseError};
pub use error::{
    RepositoryError, StorageError, StorageOperation, StorageResult, ValidationError,
};
pub use event::{compute_content_hash, ContentHash, Event, EventPayload};
pub use time::{
    format_local_timestamp, parse_local_timestamp, truncate_to_micros, LocalTimestamp,
    TimestampParseError,
};

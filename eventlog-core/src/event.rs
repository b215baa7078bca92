//! The Event record.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use crate::enums::EventType;
use crate::time::{format_local_timestamp, LocalTimestamp};

/// Hash over the content fields of an event (type, user, time).
pub type ContentHash = u64;

/// Compute the content hash of an event from its type, user and time.
///
/// The event id is not an input: two submissions describing the
/// same occurrence under different ids hash identically.
pub fn compute_content_hash(
    event_type: EventType,
    user_id: Uuid,
    time: &LocalTimestamp,
) -> ContentHash {
    let canonical = format!(
        "{}|{}|{}",
        event_type.as_str(),
        user_id,
        format_local_timestamp(time)
    );
    let digest = Sha256::digest(canonical.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// An immutable record of a user lifecycle occurrence.
///
/// Serializes through [`EventPayload`], so the content hash never appears on
/// the wire and is always recomputed when an event is decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "EventPayload", into = "EventPayload")]
pub struct Event {
    event_id: Uuid,
    event_type: EventType,
    user_id: Uuid,
    time: LocalTimestamp,
    content_hash: ContentHash,
}

impl Event {
    pub fn new(event_id: Uuid, event_type: EventType, user_id: Uuid, time: LocalTimestamp) -> Self {
        Self {
            event_id,
            event_type,
            user_id,
            time,
            content_hash: compute_content_hash(event_type, user_id, &time),
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn time(&self) -> LocalTimestamp {
        self.time
    }

    pub fn content_hash(&self) -> ContentHash {
        self.content_hash
    }

    pub fn with_event_id(self, event_id: Uuid) -> Self {
        Self { event_id, ..self }
    }

    pub fn with_event_type(self, event_type: EventType) -> Self {
        Self::new(self.event_id, event_type, self.user_id, self.time)
    }

    pub fn with_user_id(self, user_id: Uuid) -> Self {
        Self::new(self.event_id, self.event_type, user_id, self.time)
    }

    pub fn with_time(self, time: LocalTimestamp) -> Self {
        Self::new(self.event_id, self.event_type, self.user_id, time)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.event_id == other.event_id
            && self.user_id == other.user_id
            && self.event_type == other.event_type
            && self.time == other.time
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.event_id.hash(state);
        self.user_id.hash(state);
        self.event_type.hash(state);
        self.time.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event{{eventId={}, eventType={}, userId={}, time={}}}",
            self.event_id,
            self.event_type,
            self.user_id,
            format_local_timestamp(&self.time)
        )
    }
}

/// Wire representation of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(as = Event))]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub user_id: Uuid,
    #[serde(with = "crate::time::local_timestamp")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2000-01-01T12:00"))]
    pub time: LocalTimestamp,
}

impl From<EventPayload> for Event {
    fn from(payload: EventPayload) -> Self {
        Event::new(
            payload.event_id,
            payload.event_type,
            payload.user_id,
            payload.time,
        )
    }
}

impl From<Event> for EventPayload {
    fn from(event: Event) -> Self {
        Self {
            event_id: event.event_id,
            event_type: event.event_type,
            user_id: event.user_id,
            time: event.time,
        }
    }
}

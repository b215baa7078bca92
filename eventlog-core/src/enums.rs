//! Enum types for the event log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of user lifecycle occurrence an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    UserRegistration,
    UserDeleted,
    UserDeactivated,
    UserUpdatedRegistrationInfo,
}

impl EventType {
    /// Every variant, in declaration order.
    pub const ALL: [EventType; 4] = [
        EventType::UserRegistration,
        EventType::UserDeleted,
        EventType::UserDeactivated,
        EventType::UserUpdatedRegistrationInfo,
    ];

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::UserRegistration => "USER_REGISTRATION",
            EventType::UserDeleted => "USER_DELETED",
            EventType::UserDeactivated => "USER_DEACTIVATED",
            EventType::UserUpdatedRegistrationInfo => "USER_UPDATED_REGISTRATION_INFO",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = EventTypeParseError;

    /// Matching is exact: constants are case-sensitive, as on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| EventTypeParseError(s.to_string()))
    }
}

/// Error when parsing an unknown event type constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTypeParseError(pub String);

impl fmt::Display for EventTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid event type: {}", self.0)
    }
}

impl std::error::Error for EventTypeParseError {}

//! Local date-time wire format.
//!
//! Event times carry no offset. They are accepted as
//! `YYYY-MM-DDTHH:MM[:SS[.fffffffff]]` and rendered in the shortest form
//! that still represents the value exactly.

use chrono::{NaiveDateTime, SubsecRound, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Write as _};

/// Wall-clock timestamp without timezone.
pub type LocalTimestamp = NaiveDateTime;

static LOCAL_DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(?::[0-5]\d(?:\.\d{1,9})?)?$")
        .expect("Invalid local date-time regex")
});

const MINUTE_PRECISION_LEN: usize = "2000-01-01T12:00".len();

/// Error when a timestamp string is not an ISO local date-time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParseError(pub String);

impl fmt::Display for TimestampParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid local date-time: {}", self.0)
    }
}

impl std::error::Error for TimestampParseError {}

/// Parse an ISO local date-time with minute, second or sub-second precision.
pub fn parse_local_timestamp(value: &str) -> Result<LocalTimestamp, TimestampParseError> {
    if !LOCAL_DATE_TIME.is_match(value) {
        return Err(TimestampParseError(value.to_string()));
    }

    let parsed = if value.len() == MINUTE_PRECISION_LEN {
        NaiveDateTime::parse_from_str(&format!("{}:00", value), "%Y-%m-%dT%H:%M:%S")
    } else {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
    };

    parsed.map_err(|_| TimestampParseError(value.to_string()))
}

/// Render a timestamp, omitting zero seconds and trailing sub-second groups.
pub fn format_local_timestamp(timestamp: &LocalTimestamp) -> String {
    let mut out = timestamp.format("%Y-%m-%dT%H:%M").to_string();
    let seconds = timestamp.second();
    let nanos = timestamp.nanosecond();

    if seconds > 0 || nanos > 0 {
        // Writing to a String cannot fail.
        let _ = write!(out, ":{:02}", seconds);
    }
    if nanos > 0 {
        let _ = if nanos % 1_000_000 == 0 {
            write!(out, ".{:03}", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            write!(out, ".{:06}", nanos / 1_000)
        } else {
            write!(out, ".{:09}", nanos)
        };
    }
    out
}

/// Drop sub-microsecond digits, as a PostgreSQL `TIMESTAMP` column does.
pub fn truncate_to_micros(timestamp: LocalTimestamp) -> LocalTimestamp {
    timestamp.trunc_subsecs(6)
}

/// Serde adapter for `#[serde(with = "...")]` on `LocalTimestamp` fields.
pub mod local_timestamp {
    use super::{format_local_timestamp, parse_local_timestamp, LocalTimestamp};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &LocalTimestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_local_timestamp(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<LocalTimestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_local_timestamp(&raw).map_err(de::Error::custom)
    }
}

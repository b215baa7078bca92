//! Event submission decoding.
//!
//! Turns a raw request body into an `Event`, classifying failures into the
//! most specific `ValidationError` available. Checks run in this order:
//!
//! 1. every required field is present (first missing one is reported)
//! 2. `eventType` names a known constant
//! 3. `eventId` and `userId` are UUIDs
//! 4. `time` is an ISO local date-time
//!
//! Anything else, such as a syntax error or a non-object body, is an
//! unrecognized failure: it is logged at error level and reported as
//! `ValidationError::InvalidJson`.

use eventlog_core::{parse_local_timestamp, Event, EventType, ValidationError};
use serde_json::{Map, Value};
use uuid::Uuid;

/// JSON keys an event submission must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 4] = ["eventId", "eventType", "userId", "time"];

const HYPHENATED_UUID_LEN: usize = 36;

/// Decode and validate an event submission body.
pub fn decode_event(body: &[u8]) -> Result<Event, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| {
        tracing::error!(error = %err, "Unrecognised JSON error");
        ValidationError::InvalidJson
    })?;

    let fields = match value {
        Value::Object(fields) => fields,
        other => {
            tracing::error!(
                kind = json_kind(&other),
                "Unrecognised JSON error: body is not an object"
            );
            return Err(ValidationError::InvalidJson);
        }
    };

    if let Some(missing) = first_missing_field(&fields) {
        return Err(ValidationError::missing_field(missing));
    }

    let event_type = fields
        .get("eventType")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<EventType>().ok())
        .ok_or(ValidationError::InvalidEventType)?;

    let event_id = uuid_field(&fields, "eventId")?;
    let user_id = uuid_field(&fields, "userId")?;

    let time = fields
        .get("time")
        .and_then(Value::as_str)
        .and_then(|raw| parse_local_timestamp(raw).ok())
        .ok_or(ValidationError::InvalidDateTime)?;

    Ok(Event::new(event_id, event_type, user_id, time))
}

/// A field set to `null` counts as missing.
fn first_missing_field(fields: &Map<String, Value>) -> Option<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .find(|name| matches!(fields.get(*name), None | Some(Value::Null)))
}

fn uuid_field(fields: &Map<String, Value>, name: &str) -> Result<Uuid, ValidationError> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .and_then(parse_hyphenated_uuid)
        .ok_or(ValidationError::InvalidUuid)
}

/// Parse the 8-4-4-4-12 hyphenated form only. Simple, braced and URN forms
/// are rejected.
pub(crate) fn parse_hyphenated_uuid(raw: &str) -> Option<Uuid> {
    if raw.len() != HYPHENATED_UUID_LEN {
        return None;
    }
    Uuid::parse_str(raw).ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

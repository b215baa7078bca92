//! Event Log Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for events and timestamps
//! - A storage engine that always fails, for error-path tests
//! - Fixtures for common scenarios
//! - Assertions for storage results

pub use eventlog_core::{
    compute_content_hash, format_local_timestamp, parse_local_timestamp, Event, EventPayload,
    EventType, LocalTimestamp, RepositoryError, StorageError, StorageOperation, StorageResult,
};
pub use eventlog_storage::{EventRepository, InMemoryEventRepository, RepositoryResult};

use async_trait::async_trait;
use uuid::Uuid;

// ============================================================================
// FAILING REPOSITORY
// ============================================================================

/// Storage engine whose every call fails with the same error.
#[derive(Debug, Clone)]
pub struct FailingEventRepository {
    error: RepositoryError,
}

impl FailingEventRepository {
    pub fn new(error: RepositoryError) -> Self {
        Self { error }
    }

    /// Fails like a database that refuses connections.
    pub fn connection_refused() -> Self {
        Self::new(RepositoryError::Connection {
            reason: "connection refused".to_string(),
        })
    }
}

impl Default for FailingEventRepository {
    fn default() -> Self {
        Self::connection_refused()
    }
}

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn save(&self, _event: &Event) -> RepositoryResult<Event> {
        Err(self.error.clone())
    }

    async fn find_by_id(&self, _event_id: Uuid) -> RepositoryResult<Option<Event>> {
        Err(self.error.clone())
    }

    async fn find_all_by_user_id(&self, _user_id: Uuid) -> RepositoryResult<Vec<Event>> {
        Err(self.error.clone())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Err(self.error.clone())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for event log types.

    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate any of the event type constants.
    pub fn arb_event_type() -> impl Strategy<Value = EventType> {
        prop::sample::select(EventType::ALL.to_vec())
    }

    /// Generate a sub-second part at minute, second, milli, micro or nano precision.
    fn arb_nanos() -> impl Strategy<Value = u32> {
        prop_oneof![
            Just(0u32),
            (0u32..1_000).prop_map(|ms| ms * 1_000_000),
            (0u32..1_000_000).prop_map(|us| us * 1_000),
            0u32..1_000_000_000,
        ]
    }

    fn arb_timestamp_with(nanos: BoxedStrategy<u32>) -> impl Strategy<Value = LocalTimestamp> {
        (1970i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60, nanos)
            .prop_filter_map("valid calendar date", |(y, mo, d, h, mi, s, ns)| {
                NaiveDate::from_ymd_opt(y, mo, d).and_then(|date| date.and_hms_nano_opt(h, mi, s, ns))
            })
    }

    /// Generate a local timestamp with up to nanosecond precision.
    pub fn arb_local_timestamp() -> impl Strategy<Value = LocalTimestamp> {
        arb_timestamp_with(arb_nanos().boxed())
    }

    /// Generate a local timestamp with at most microsecond precision,
    /// matching what a PostgreSQL `TIMESTAMP` column can hold.
    pub fn arb_local_timestamp_micros() -> impl Strategy<Value = LocalTimestamp> {
        arb_timestamp_with((0u32..1_000_000).prop_map(|us| us * 1_000).boxed())
    }

    /// Generate an event with random fields.
    pub fn arb_event() -> impl Strategy<Value = Event> {
        (arb_uuid(), arb_event_type(), arb_uuid(), arb_local_timestamp())
            .prop_map(|(event_id, event_type, user_id, time)| {
                Event::new(event_id, event_type, user_id, time)
            })
    }

    /// Generate 0..max events for one user, with distinct event ids.
    pub fn arb_user_events(max: usize) -> impl Strategy<Value = (Uuid, Vec<Event>)> {
        arb_uuid().prop_flat_map(move |user_id| {
            (
                Just(user_id),
                prop::collection::hash_map(
                    arb_uuid(),
                    (arb_event_type(), arb_local_timestamp()),
                    0..max,
                )
                .prop_map(move |entries| {
                    entries
                        .into_iter()
                        .map(|(event_id, (event_type, time))| {
                            Event::new(event_id, event_type, user_id, time)
                        })
                        .collect::<Vec<_>>()
                }),
            )
        })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Ready-made events for scenario tests.

    use super::*;
    use serde_json::{json, Value};

    pub const EVENT_ID: &str = "00000000-0000-0000-0000-000000000000";
    pub const USER_ID: &str = "10000000-1111-1111-1111-000000000001";

    /// Parse a fixture timestamp. Panics on malformed input.
    #[track_caller]
    pub fn timestamp(raw: &str) -> LocalTimestamp {
        parse_local_timestamp(raw)
            .unwrap_or_else(|e| panic!("fixture timestamp {:?} is invalid: {}", raw, e))
    }

    /// Parse a fixture UUID. Panics on malformed input.
    #[track_caller]
    pub fn uuid(raw: &str) -> Uuid {
        Uuid::parse_str(raw).unwrap_or_else(|e| panic!("fixture uuid {:?} is invalid: {}", raw, e))
    }

    /// A registration event with fixed ids and time.
    pub fn registration_event() -> Event {
        Event::new(
            uuid(EVENT_ID),
            EventType::UserRegistration,
            uuid(USER_ID),
            timestamp("2020-01-01T12:00"),
        )
    }

    /// An event with fresh ids.
    pub fn random_event(event_type: EventType, time: &str) -> Event {
        Event::new(Uuid::new_v4(), event_type, Uuid::new_v4(), timestamp(time))
    }

    /// An event with a fresh id for the given user.
    pub fn event_for_user(user_id: Uuid, event_type: EventType, time: &str) -> Event {
        Event::new(Uuid::new_v4(), event_type, user_id, timestamp(time))
    }

    /// The JSON body a client would send for `event`.
    pub fn event_json(event: &Event) -> Value {
        json!({
            "eventId": event.event_id().to_string(),
            "eventType": event.event_type().as_str(),
            "userId": event.user_id().to_string(),
            "time": format_local_timestamp(&event.time()),
        })
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for storage results.

    use super::*;

    /// Assert that a storage call failed in the given operation.
    #[track_caller]
    pub fn assert_storage_failure<T: std::fmt::Debug>(
        result: &StorageResult<T>,
        operation: StorageOperation,
    ) {
        match result {
            Err(err) => assert_eq!(err.operation, operation, "unexpected operation in {:?}", err),
            Ok(value) => panic!("Expected {} failure, got Ok: {:?}", operation, value),
        }
    }

    /// Assert that every event belongs to `user_id` and is ordered by (time, id).
    #[track_caller]
    pub fn assert_user_timeline(events: &[Event], user_id: Uuid) {
        for event in events {
            assert_eq!(event.user_id(), user_id, "foreign event in timeline: {}", event);
        }
        for pair in events.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                (a.time(), a.event_id()) <= (b.time(), b.event_id()),
                "timeline out of order: {} before {}",
                a,
                b
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

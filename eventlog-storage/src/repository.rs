//! Async storage engine interface.

use ::async_trait::async_trait;
use eventlog_core::{Event, RepositoryError};
use uuid::Uuid;

/// Result type alias for storage engine calls.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage engine for events.
///
/// Implementations keep a single collection keyed by `event_id` with a
/// secondary lookup path by `user_id`.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert or overwrite the event stored under `event.event_id()`.
    ///
    /// Returns the record as persisted, which may be normalized by the engine.
    async fn save(&self, event: &Event) -> RepositoryResult<Event>;

    /// Point lookup by primary key. `Ok(None)` when no record matches.
    async fn find_by_id(&self, event_id: Uuid) -> RepositoryResult<Option<Event>>;

    /// All events for a user, ordered by `(time, event_id)`.
    async fn find_all_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Vec<Event>>;

    /// Verify the engine is reachable.
    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

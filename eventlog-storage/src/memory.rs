//! In-memory storage engine.

use ::async_trait::async_trait;
use eventlog_core::{Event, RepositoryError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::repository::{EventRepository, RepositoryResult};

/// Process-local `EventRepository` backed by a `HashMap` keyed by event id.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub fn len(&self) -> RepositoryResult<usize> {
        self.events
            .read()
            .map(|events| events.len())
            .map_err(|_| RepositoryError::LockPoisoned)
    }

    pub fn is_empty(&self) -> RepositoryResult<bool> {
        self.len().map(|count| count == 0)
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn save(&self, event: &Event) -> RepositoryResult<Event> {
        let mut events = self
            .events
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        events.insert(event.event_id(), event.clone());
        Ok(event.clone())
    }

    async fn find_by_id(&self, event_id: Uuid) -> RepositoryResult<Option<Event>> {
        let events = self
            .events
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(events.get(&event_id).cloned())
    }

    async fn find_all_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Vec<Event>> {
        let events = self
            .events
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut matching: Vec<Event> = events
            .values()
            .filter(|event| event.user_id() == user_id)
            .cloned()
            .collect();
        matching.sort_by_key(|event| (event.time(), event.event_id()));
        Ok(matching)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.events
            .read()
            .map(|_| ())
            .map_err(|_| RepositoryError::LockPoisoned)
    }
}

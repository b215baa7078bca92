//! Event Service
//!
//! Pass-through delegation to the storage gateway for the three event
//! operations. Storage failures propagate unchanged.

use eventlog_core::{Event, StorageResult};
use eventlog_storage::StorageGateway;
use uuid::Uuid;

/// Service behind the event routes.
#[derive(Clone)]
pub struct EventLogService {
    gateway: StorageGateway,
}

impl EventLogService {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// Persist an event, overwriting any record with the same id.
    pub async fn log_event(&self, event: Event) -> StorageResult<Event> {
        self.gateway.save(&event).await
    }

    pub async fn get_event_by_id(&self, event_id: Uuid) -> StorageResult<Option<Event>> {
        self.gateway.find_by_id(event_id).await
    }

    pub async fn get_events_for_user(&self, user_id: Uuid) -> StorageResult<Vec<Event>> {
        self.gateway.find_all_by_user_id(user_id).await
    }
}

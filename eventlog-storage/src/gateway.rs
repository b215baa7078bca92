//! Storage gateway.
//!
//! Sole point of contact with the storage engine. Every call is logged at
//! info level before and after it reaches the store, and every engine
//! failure is logged at error level and converted to `StorageError`.
//! Failures are surfaced after a single attempt; retry policy belongs to
//! the caller.

use eventlog_core::{Event, RepositoryError, StorageError, StorageOperation, StorageResult};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::repository::EventRepository;

/// Adapter between the event service and an [`EventRepository`].
#[derive(Clone)]
pub struct StorageGateway {
    repository: Arc<dyn EventRepository>,
}

impl StorageGateway {
    pub fn new(repository: Arc<dyn EventRepository>) -> Self {
        Self { repository }
    }

    /// Upsert an event by its id, returning the persisted record.
    pub async fn save(&self, event: &Event) -> StorageResult<Event> {
        let event_id = event.event_id();
        tracing::info!(%event_id, "Saving event");
        let start = Instant::now();

        let record = self
            .repository
            .save(event)
            .await
            .map_err(|cause| fail(StorageOperation::Save, &event_id, cause))?;

        tracing::info!(
            %event_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Added event in storage"
        );
        Ok(record)
    }

    /// Look up an event by id. Absence is `Ok(None)`, not an error.
    pub async fn find_by_id(&self, event_id: Uuid) -> StorageResult<Option<Event>> {
        tracing::info!(%event_id, "Searching for event");
        let start = Instant::now();

        let event = self
            .repository
            .find_by_id(event_id)
            .await
            .map_err(|cause| fail(StorageOperation::FindById, &event_id, cause))?;

        tracing::info!(
            %event_id,
            found = event.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Event lookup complete"
        );
        Ok(event)
    }

    /// All events recorded for a user; empty when there are none.
    pub async fn find_all_by_user_id(&self, user_id: Uuid) -> StorageResult<Vec<Event>> {
        tracing::info!(%user_id, "Getting events for user");
        let start = Instant::now();

        let events = self
            .repository
            .find_all_by_user_id(user_id)
            .await
            .map_err(|cause| fail(StorageOperation::FindAllByUserId, &user_id, cause))?;

        tracing::info!(
            %user_id,
            count = events.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "User event lookup complete"
        );
        Ok(events)
    }

    /// Probe the storage engine.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.repository.health_check().await.map_err(|cause| {
            tracing::error!(operation = %StorageOperation::HealthCheck, error = %cause, "Storage health check failed");
            StorageError::new(StorageOperation::HealthCheck, cause)
        })
    }
}

fn fail(operation: StorageOperation, id: &Uuid, cause: RepositoryError) -> StorageError {
    tracing::error!(%operation, %id, error = %cause, "Storage operation failed");
    StorageError::new(operation, cause)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryEventRepository;
    use crate::repository::RepositoryResult;
    use ::async_trait::async_trait;
    use eventlog_core::{parse_local_timestamp, EventType};

    struct BrokenRepository;

    #[async_trait]
    impl EventRepository for BrokenRepository {
        async fn save(&self, _event: &Event) -> RepositoryResult<Event> {
            Err(RepositoryError::ConstraintViolation {
                constraint: "event_pkey".to_string(),
                reason: "duplicate".to_string(),
            })
        }

        async fn find_by_id(&self, _event_id: Uuid) -> RepositoryResult<Option<Event>> {
            Err(RepositoryError::Connection {
                reason: "connection refused".to_string(),
            })
        }

        async fn find_all_by_user_id(&self, _user_id: Uuid) -> RepositoryResult<Vec<Event>> {
            Err(RepositoryError::InvalidArgument {
                reason: "null user id".to_string(),
            })
        }

        async fn health_check(&self) -> RepositoryResult<()> {
            Err(RepositoryError::Connection {
                reason: "down".to_string(),
            })
        }
    }

    fn make_test_event() -> Event {
        Event::new(
            Uuid::new_v4(),
            EventType::UserUpdatedRegistrationInfo,
            Uuid::new_v4(),
            parse_local_timestamp("2021-06-01T08:00:00").expect("valid test time"),
        )
    }

    #[tokio::test]
    async fn test_gateway_passes_through_results() -> StorageResult<()> {
        let gateway = StorageGateway::new(Arc::new(InMemoryEventRepository::new()));
        let event = make_test_event();

        assert_eq!(gateway.save(&event).await?, event);
        assert_eq!(gateway.find_by_id(event.event_id()).await?, Some(event.clone()));
        assert_eq!(gateway.find_by_id(Uuid::new_v4()).await?, None);
        assert_eq!(gateway.find_all_by_user_id(event.user_id()).await?, vec![event]);
        gateway.health_check().await
    }

    #[tokio::test]
    async fn test_gateway_normalizes_every_failure() {
        let gateway = StorageGateway::new(Arc::new(BrokenRepository));
        let event = make_test_event();

        let err = gateway.save(&event).await.err();
        assert!(matches!(
            err,
            Some(StorageError {
                operation: StorageOperation::Save,
                cause: RepositoryError::ConstraintViolation { .. },
            })
        ));

        let err = gateway.find_by_id(event.event_id()).await.err();
        assert_eq!(err.map(|e| e.operation), Some(StorageOperation::FindById));

        let err = gateway.find_all_by_user_id(event.user_id()).await.err();
        assert_eq!(err.map(|e| e.operation), Some(StorageOperation::FindAllByUserId));

        let err = gateway.health_check().await.err();
        assert_eq!(err.map(|e| e.operation), Some(StorageOperation::HealthCheck));
    }
}

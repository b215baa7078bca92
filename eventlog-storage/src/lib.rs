//! Event Log Storage - Repository Trait, In-Memory Engine and Gateway
//!
//! `EventRepository` is the generic storage-engine interface (upsert by
//! primary key, point lookup, lookup by user). `StorageGateway` is the only
//! component the service talks to: it logs every store call and normalizes
//! engine failures into `StorageError`.

pub mod gateway;
pub mod memory;
pub mod repository;

pub use gateway::StorageGateway;
pub use memory::InMemoryEventRepository;
pub use repository::{EventRepository, RepositoryResult};

//! Service Layer
//!
//! Orchestration between the HTTP routes and the storage gateway. Business
//! rules for events (validation beyond decoding, enrichment) belong here
//! rather than in routes or storage.

mod event_service;

pub use event_service::*;

//! Custom Axum extractors.

pub mod event_json;
pub mod path_id;

pub use event_json::EventJson;
pub use path_id::PathId;

//! Shared in-process router setup for HTTP tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use eventlog_api::{create_api_router, ApiConfig, EventLogService};
use eventlog_storage::{EventRepository, InMemoryEventRepository, StorageGateway};
use tower::ServiceExt;

/// Response pieces the tests look at.
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Result<serde_json::Value, String> {
        serde_json::from_slice(&self.body)
            .map_err(|e| format!("Response is not JSON ({}): {:?}", e, self.text()))
    }

    /// The `error` field of a `{"error": "..."}` body.
    pub fn error_message(&self) -> Result<String, String> {
        self.json()?
            .get("error")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| format!("No error field in {:?}", self.text()))
    }
}

/// Router over `repository` with the given config.
pub fn test_app_with(repository: Arc<dyn EventRepository>, config: &ApiConfig) -> Router {
    let gateway = StorageGateway::new(repository);
    let service = Arc::new(EventLogService::new(gateway.clone()));
    create_api_router(service, gateway, config)
}

/// Router over a fresh in-memory store, plus a handle on that store.
pub fn test_app() -> (Router, InMemoryEventRepository) {
    let repository = InMemoryEventRepository::new();
    let app = test_app_with(Arc::new(repository.clone()), &ApiConfig::default());
    (app, repository)
}

pub fn get(uri: &str) -> Result<Request<Body>, String> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .map_err(|e| e.to_string())
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Result<Request<Body>, String> {
    post_with_content_type(uri, "application/json", body)
}

pub fn post_with_content_type(
    uri: &str,
    content_type: &str,
    body: impl Into<String>,
) -> Result<Request<Body>, String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.into()))
        .map_err(|e| e.to_string())
}

pub async fn send(app: &Router, request: Request<Body>) -> Result<TestResponse, String> {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| format!("Request failed: {:?}", e))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| format!("Failed to read body: {}", e))?
        .to_vec();

    Ok(TestResponse {
        status,
        content_type,
        body,
    })
}

//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by a mock document store, so the HTTP surface can be exercised
//! without a database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use btagg_core::testing::MockDocumentStore;
use btagg_core::{Config, DocumentStore, SearchService};
use btagg_server::state::AppState;

/// Re-export fixtures for test convenience
pub use btagg_core::testing::fixtures;

/// Test fixture for E2E testing with a mock document store.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new();
///     fixture.store.add_collection("videos", vec![
///         fixtures::document("ABC-123", "Sample", None),
///     ]).await;
///
///     let response = fixture.get("/api/bt?keyword=abc").await;
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock document store - configure collections, failures and delays
    pub store: Arc<MockDocumentStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON body, `Null` when the body is empty or not JSON.
    pub body: Value,
    /// Raw body text.
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MockDocumentStore::new());
        let search = SearchService::from_config(
            &config,
            Arc::clone(&store) as Arc<dyn DocumentStore>,
        );
        let state = Arc::new(AppState::new(config, search));
        let router = btagg_server::api::create_router(state);

        Self { router, store }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}

//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! around a display orchestrator fed by mock sources, so the API can be
//! exercised without network access.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use weatharr_core::{
    load_config_from_str,
    testing::{MockFeedSource, RecordingDisplaySink},
    Config, DisplayOrchestrator, FeedCategory, FeedSource,
};

/// Re-export fixtures for test convenience
pub use weatharr_core::testing::fixtures;

/// Minimal configuration with fast rendering for tests.
pub const TEST_CONFIG: &str = r#"
[station]
name = "Test Station"
latitude = 29.735
longitude = -94.977
user_agent = "weatharr-tests (ops@example.com)"

[server]
host = "127.0.0.1"
port = 8080

[headlines]
rss_urls = ["https://news.example.com/rss.xml"]

[rotation]
default_dwell_secs = 0.2

[display]
render_interval_ms = 10
shutdown_grace_ms = 500
"#;

/// Test fixture for API testing with mock sources.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() {
///     let fixture = TestFixture::new(&[]).await;
///     let response = fixture.get("/api/v1/health").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The orchestrator behind the router
    pub orchestrator: Arc<DisplayOrchestrator>,
    /// Mock sources by registration order
    pub sources: Vec<Arc<MockFeedSource>>,
    /// Sink receiving every rendered frame
    pub sink: Arc<RecordingDisplaySink>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture whose sources always succeed for `categories`.
    /// The orchestrator is started and given time for the first fetches.
    pub async fn new(categories: &[FeedCategory]) -> Self {
        let config = test_config();

        let sources: Vec<Arc<MockFeedSource>> = categories
            .iter()
            .map(|c| {
                Arc::new(MockFeedSource::new(*c).with_fallback(Ok(fixtures::payload_for(*c))))
            })
            .collect();
        let sink = Arc::new(RecordingDisplaySink::new());

        let orchestrator = Arc::new(
            DisplayOrchestrator::from_config(
                &config,
                sources
                    .iter()
                    .map(|s| Arc::clone(s) as Arc<dyn FeedSource>)
                    .collect(),
                sink.clone(),
            )
            .expect("Failed to create orchestrator"),
        );
        orchestrator
            .start()
            .await
            .expect("Failed to start orchestrator");

        for source in &sources {
            assert!(source.wait_for_calls(1, Duration::from_secs(2)).await);
        }
        // Let the render loop pick up the first snapshots.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let state = Arc::new(weatharr_server::state::AppState::new(
            config,
            Arc::clone(&orchestrator),
        ));
        let router = weatharr_server::api::create_router(state);

        Self {
            router,
            orchestrator,
            sources,
            sink,
        }
    }

    /// Stop the orchestrator.
    pub async fn shutdown(&self) {
        self.orchestrator
            .stop()
            .await
            .expect("Failed to stop orchestrator");
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
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            content_type,
            bytes,
            body,
        }
    }
}

pub fn test_config() -> Config {
    load_config_from_str(TEST_CONFIG).expect("Failed to parse test config")
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

//! Common test utilities for router tests with mocks.
//!
//! This module provides a test fixture that builds the full router in
//! process, with mock delegates injected and a temporary workspace root,
//! so requests can be driven end to end without ffmpeg or a speech engine.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use vidspeak_core::{
    testing::{MockEncoder, MockImageFetcher, MockSynthesizer},
    Config, Delegates, ImageFetcher, PipelineConfig, StageDeadlines, VideoPipeline, Workspace,
};

/// Re-export fixtures for test convenience
pub use vidspeak_core::testing::fixtures;

/// Test fixture for router tests with mock delegates.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_generate() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/generate-video", json!({
///         "text": "Hola",
///         "image_url": "https://example.com/cat.png"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock image fetcher
    pub fetcher: Arc<MockImageFetcher>,
    /// Mock speech synthesizer
    pub synthesizer: Arc<MockSynthesizer>,
    /// Mock encoder
    pub encoder: Arc<MockEncoder>,
    /// Server-wide shutdown token
    pub shutdown: CancellationToken,
    /// Workspace root inside `temp_dir`
    pub workspace_root: PathBuf,
    /// Keeps the workspace alive for the fixture's lifetime
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Pipeline admission settings
    pub pipeline: Option<PipelineConfig>,
    /// Stage deadlines
    pub deadlines: Option<StageDeadlines>,
    /// Echo internal error causes
    pub expose_error_details: bool,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with a custom image fetcher.
    pub async fn with_fetcher(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self::build(TestConfig::default(), Some(fetcher)).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        Self::build(test_config, None).await
    }

    async fn build(
        test_config: TestConfig,
        fetcher_override: Option<Arc<dyn ImageFetcher>>,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let workspace_root = temp_dir.path().join("work");

        let mut config = Config::default();
        config.workspace.root = workspace_root.clone();
        config.server.expose_error_details = test_config.expose_error_details;
        if let Some(ref pipeline) = test_config.pipeline {
            config.pipeline = pipeline.clone();
        }

        let workspace = Workspace::open(&workspace_root)
            .await
            .expect("Failed to open workspace");

        // Create mocks
        let fetcher = Arc::new(MockImageFetcher::new());
        let synthesizer = Arc::new(MockSynthesizer::new());
        let encoder = Arc::new(MockEncoder::new());

        let delegates = Delegates {
            fetcher: fetcher_override.unwrap_or_else(|| fetcher.clone() as Arc<dyn ImageFetcher>),
            synthesizer: synthesizer.clone(),
            encoder: encoder.clone(),
        };

        let pipeline = Arc::new(VideoPipeline::new(
            workspace,
            delegates,
            config.pipeline.clone(),
            test_config
                .deadlines
                .unwrap_or_else(|| StageDeadlines::from_config(&config)),
        ));

        let shutdown = CancellationToken::new();
        let state = Arc::new(vidspeak_server::state::AppState::new(
            config,
            pipeline,
            shutdown.clone(),
        ));

        // Create router
        let router = vidspeak_server::api::create_router(state);

        Self {
            router,
            fetcher,
            synthesizer,
            encoder,
            shutdown,
            workspace_root,
            temp_dir,
        }
    }

    /// Whether the workspace root drains once pending cleanup has run.
    pub async fn workspace_is_empty(&self) -> bool {
        fixtures::wait_for_empty_dir(&self.workspace_root).await
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.post_raw(path, &serde_json::to_string(&body).unwrap())
            .await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.post_with_content_type(path, body, "application/json")
            .await
    }

    /// Send a POST request with custom content type.
    pub async fn post_with_content_type(
        &self,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
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
            headers,
            bytes,
            body,
        }
    }
}

/// A request body that passes validation.
pub fn valid_request() -> Value {
    serde_json::json!({
        "text": "Hola mundo",
        "image_url": "https://images.example.com/cat.png"
    })
}

//! Pipeline lifecycle integration tests.
//!
//! These run `VideoPipeline` with the real HTTP fetcher and the OpenAI
//! synthesizer against local wiremock servers, and the mock encoder:
//! - Artifacts land in one scratch directory with the work item prefix
//! - Remote failures map to the right pipeline error
//! - The workspace root is empty after every run

use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidspeak_core::fetcher::FetcherConfig;
use vidspeak_core::synthesizer::{OpenAiConfig, OpenAiSynthesizer};
use vidspeak_core::testing::{fixtures, MockEncoder};
use vidspeak_core::{
    Delegates, GenerateVideoRequest, HttpImageFetcher, PipelineConfig, PipelineError,
    StageDeadlines, VideoPipeline, Workspace,
};

/// Test helper wiring real HTTP delegates to local servers.
struct TestHarness {
    pipeline: VideoPipeline,
    encoder: Arc<MockEncoder>,
    images: MockServer,
    speech: MockServer,
    _temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = Workspace::open(temp_dir.path().join("work"))
            .await
            .expect("Failed to open workspace");

        let images = MockServer::start().await;
        let speech = MockServer::start().await;

        let fetcher =
            HttpImageFetcher::new(FetcherConfig::default().allowing_private_networks()).unwrap();
        let synthesizer = OpenAiSynthesizer::new(OpenAiConfig {
            base_url: format!("{}/v1", speech.uri()),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap();
        let encoder = Arc::new(MockEncoder::new());

        let pipeline = VideoPipeline::new(
            workspace,
            Delegates {
                fetcher: Arc::new(fetcher),
                synthesizer: Arc::new(synthesizer),
                encoder: encoder.clone(),
            },
            PipelineConfig::default(),
            StageDeadlines::default(),
        );

        Self {
            pipeline,
            encoder,
            images,
            speech,
            _temp_dir: temp_dir,
        }
    }

    async fn serve_image(&self, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/cat"))
            .respond_with(template)
            .mount(&self.images)
            .await;
    }

    async fn serve_speech(&self, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(template)
            .mount(&self.speech)
            .await;
    }

    fn request(&self) -> GenerateVideoRequest {
        GenerateVideoRequest {
            text: "Hola mundo".to_string(),
            image_url: Url::parse(&format!("{}/cat", self.images.uri())).unwrap(),
            duration: Some(3.0),
            fps: 25,
            voice: Some("shimmer".to_string()),
        }
    }

    async fn root_is_empty(&self) -> bool {
        fixtures::wait_for_empty_dir(self.pipeline.workspace().root()).await
    }
}

#[tokio::test]
async fn test_full_run_with_http_delegates() {
    let h = TestHarness::new().await;
    h.serve_image(ResponseTemplate::new(200).set_body_raw(fixtures::png_bytes(33, 21), "image/jpeg"))
        .await;
    h.serve_speech(ResponseTemplate::new(200).set_body_raw(b"ID3audio".to_vec(), "audio/mpeg"))
        .await;

    let output = h
        .pipeline
        .handle(&h.request(), &CancellationToken::new())
        .await
        .unwrap();

    let id = output.scratch.id().to_string();
    let jobs = h.encoder.recorded_jobs().await;
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert!(job.image_path.ends_with(format!("{}_image.jpg", id)));
    assert!(job.audio_path.ends_with(format!("{}_audio.mp3", id)));
    assert_eq!(job.duration_secs, Some(3.0));
    assert_eq!(job.fps, Some(25));
    assert_eq!(std::fs::read(&job.audio_path).unwrap(), b"ID3audio");

    let speech_calls = h.speech.received_requests().await.unwrap();
    assert_eq!(speech_calls.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&speech_calls[0].body).unwrap();
    assert_eq!(body["voice"], "shimmer");
    assert_eq!(body["input"], "Hola mundo");

    drop(output);
    assert!(h.root_is_empty().await);
}

#[tokio::test]
async fn test_image_404_is_invalid_image_source() {
    let h = TestHarness::new().await;
    h.serve_image(ResponseTemplate::new(404)).await;

    let err = h
        .pipeline
        .handle(&h.request(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidImageSource { .. }));
    assert!(h.speech.received_requests().await.unwrap().is_empty());
    assert!(h.root_is_empty().await);
}

#[tokio::test]
async fn test_corrupt_image_is_invalid_image_source() {
    let h = TestHarness::new().await;
    h.serve_image(ResponseTemplate::new(200).set_body_raw(b"GIF89a-truncated".to_vec(), "image/gif"))
        .await;

    let err = h
        .pipeline
        .handle(&h.request(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "Invalid Image Source");
    assert!(h.root_is_empty().await);
}

#[tokio::test]
async fn test_speech_api_error_is_tts_failure() {
    let h = TestHarness::new().await;
    h.serve_image(ResponseTemplate::new(200).set_body_raw(fixtures::png_bytes(8, 8), "image/png"))
        .await;
    h.serve_speech(ResponseTemplate::new(500).set_body_raw("upstream down", "text/plain"))
        .await;

    let err = h
        .pipeline
        .handle(&h.request(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::TtsFailure { .. }));
    assert_eq!(err.status_code(), 500);
    assert_eq!(h.encoder.encode_count().await, 0);
    assert!(h.root_is_empty().await);
}

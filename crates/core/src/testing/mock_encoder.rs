//! Mock video encoder for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::encoder::{EncodeJob, EncodeResult, EncoderError, VideoEncoder};

/// Bytes written as the "video".
pub const MOCK_VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42mock-video-payload";

/// Mock implementation of the VideoEncoder trait.
///
/// Records each job and writes a fixed payload to its output path.
#[derive(Debug)]
pub struct MockEncoder {
    /// Jobs submitted, in order.
    jobs: Arc<RwLock<Vec<EncodeJob>>>,
    /// If set, the next encode will fail with this error.
    next_error: Arc<RwLock<Option<EncoderError>>>,
    /// Simulated encode time.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Create a new mock encoder.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded jobs.
    pub async fn recorded_jobs(&self) -> Vec<EncodeJob> {
        self.jobs.read().await.clone()
    }

    /// Get the number of encodes performed.
    pub async fn encode_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Make the next encode fail with the given error.
    pub async fn set_next_error(&self, error: EncoderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay each encode, e.g. to test deadlines.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl VideoEncoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn encode(&self, job: &EncodeJob) -> Result<EncodeResult, EncoderError> {
        self.jobs.write().await.push(job.clone());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        for input in [&job.image_path, &job.audio_path] {
            if !tokio::fs::try_exists(input).await? {
                return Err(EncoderError::InputNotFound {
                    path: input.clone(),
                });
            }
        }

        tokio::fs::write(&job.output_path, MOCK_VIDEO_BYTES).await?;

        Ok(EncodeResult {
            output_path: job.output_path.clone(),
            size_bytes: MOCK_VIDEO_BYTES.len() as u64,
            duration_ms: delay.as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        Ok(())
    }
}

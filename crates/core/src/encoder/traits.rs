//! Trait definitions for the encoder module.

use async_trait::async_trait;

use super::error::EncoderError;
use super::types::{EncodeJob, EncodeResult};

/// Produces a video file from an image and an audio track.
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Runs one encode. Dropping the future kills any child process.
    async fn encode(&self, job: &EncodeJob) -> Result<EncodeResult, EncoderError>;

    /// Checks that the encoder is usable. Called once at startup.
    async fn validate(&self) -> Result<(), EncoderError>;
}

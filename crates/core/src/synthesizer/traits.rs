//! Trait definitions for the synthesizer module.

use async_trait::async_trait;
use std::path::Path;

use super::error::SynthesisError;
use super::types::{AudioFormat, SynthesisResult};

/// Converts text to a speech audio file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns the name of this backend.
    fn name(&self) -> &str;

    /// Container this backend writes. The caller picks the output
    /// extension from it.
    fn audio_format(&self) -> AudioFormat;

    /// Writes speech for `text` to `output_path`.
    ///
    /// `voice` overrides the configured voice for this call. On success the
    /// file exists and is non-empty. The call is cancelled by dropping the
    /// returned future.
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        output_path: &Path,
    ) -> Result<SynthesisResult, SynthesisError>;

    /// Checks that the backend is usable. Called once at startup.
    async fn validate(&self) -> Result<(), SynthesisError>;
}

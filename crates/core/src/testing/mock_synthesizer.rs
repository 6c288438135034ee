//! Mock speech synthesizer for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::synthesizer::{AudioFormat, SpeechSynthesizer, SynthesisError, SynthesisResult};

/// Mock implementation of the SpeechSynthesizer trait.
///
/// Writes a short silent WAV for every call.
#[derive(Debug)]
pub struct MockSynthesizer {
    /// Texts submitted, in order.
    texts: Arc<RwLock<Vec<String>>>,
    /// Voice override of each call, in order.
    voices: Arc<RwLock<Vec<Option<String>>>>,
    /// If set, the next synthesis will fail with this error.
    next_error: Arc<RwLock<Option<SynthesisError>>>,
    /// Simulated synthesis time.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSynthesizer {
    /// Create a new mock synthesizer.
    pub fn new() -> Self {
        Self {
            texts: Arc::new(RwLock::new(Vec::new())),
            voices: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all submitted texts.
    pub async fn recorded_texts(&self) -> Vec<String> {
        self.texts.read().await.clone()
    }

    /// Get the voice override passed with each call.
    pub async fn recorded_voices(&self) -> Vec<Option<String>> {
        self.voices.read().await.clone()
    }

    /// Get the number of synthesis calls.
    pub async fn synthesize_count(&self) -> usize {
        self.texts.read().await.len()
    }

    /// Make the next synthesis fail with the given error.
    pub async fn set_next_error(&self, error: SynthesisError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay each synthesis, e.g. to test deadlines.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        output_path: &Path,
    ) -> Result<SynthesisResult, SynthesisError> {
        self.texts.write().await.push(text.to_string());
        self.voices.write().await.push(voice.map(str::to_string));

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        tokio::fs::write(output_path, fixtures::wav_bytes()).await?;
        SynthesisResult::from_output(output_path, AudioFormat::Wav).await
    }

    async fn validate(&self) -> Result<(), SynthesisError> {
        Ok(())
    }
}

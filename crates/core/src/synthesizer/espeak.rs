//! espeak-ng subprocess backend.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::config::EspeakConfig;
use super::error::SynthesisError;
use super::traits::SpeechSynthesizer;
use super::types::{AudioFormat, SynthesisResult};
use crate::process::{stderr_tail, STDERR_TAIL_LINES};

/// Speaks text with a local espeak-ng binary.
///
/// Text goes to the child's stdin so that it never appears in argv.
pub struct EspeakSynthesizer {
    config: EspeakConfig,
}

impl EspeakSynthesizer {
    pub fn new(config: EspeakConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(EspeakConfig::default())
    }

    /// Builds the espeak-ng argument list for one run. `voice` takes
    /// precedence over the configured voice.
    pub fn build_args(&self, output_path: &Path, voice: Option<&str>) -> Vec<String> {
        let mut args = vec![
            // UTF-8 input
            "-b".to_string(),
            "1".to_string(),
            "--stdin".to_string(),
            "-w".to_string(),
            output_path.to_string_lossy().to_string(),
        ];

        if let Some(voice) = voice.or(self.config.voice.as_deref()) {
            args.push("-v".to_string());
            args.push(voice.to_string());
        }
        if let Some(rate) = self.config.rate_wpm {
            args.push("-s".to_string());
            args.push(rate.to_string());
        }

        args
    }

    fn map_spawn_error(&self, e: std::io::Error) -> SynthesisError {
        if e.kind() == std::io::ErrorKind::NotFound {
            SynthesisError::EngineNotFound {
                path: self.config.binary.clone(),
            }
        } else {
            SynthesisError::Io(e)
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    fn name(&self) -> &str {
        "espeak"
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
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let args = self.build_args(output_path, voice);
        debug!(binary = %self.config.binary.display(), args = ?args, "Running espeak-ng");

        let mut child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.map_spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(text.as_bytes()).await {
                Ok(()) => {}
                // The engine exited early; its status tells the story.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(SynthesisError::Io(e)),
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SynthesisError::engine_failed(
                format!("espeak-ng exited with {}", output.status),
                stderr_tail(&output.stderr, STDERR_TAIL_LINES),
            ));
        }

        SynthesisResult::from_output(output_path, AudioFormat::Wav).await
    }

    async fn validate(&self) -> Result<(), SynthesisError> {
        let output = Command::new(&self.config.binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(SynthesisError::engine_failed(
                "espeak-ng --version failed",
                stderr_tail(&output.stderr, STDERR_TAIL_LINES),
            ));
        }
        Ok(())
    }
}

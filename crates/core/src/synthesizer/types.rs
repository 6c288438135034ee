//! Types for the synthesizer module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::SynthesisError;

/// Audio container a backend writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

/// Result of a successful synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Path of the written audio file.
    pub path: PathBuf,
    pub format: AudioFormat,
    pub size_bytes: u64,
}

impl SynthesisResult {
    /// Builds a result from a file the backend just wrote, rejecting a
    /// missing or empty file.
    pub async fn from_output(path: &Path, format: AudioFormat) -> Result<Self, SynthesisError> {
        let size_bytes = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(SynthesisError::Io(e)),
        };
        if size_bytes == 0 {
            return Err(SynthesisError::EmptyOutput {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            format,
            size_bytes,
        })
    }
}

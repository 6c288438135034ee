//! Error types for the encoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while encoding.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// ffmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// An input file is missing.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// ffmpeg exited unsuccessfully.
    #[error("Encoding failed: {reason}")]
    EncodingFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// ffmpeg exited cleanly but left no output.
    #[error("Encoder produced no output at {path}")]
    MissingOutput { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncoderError {
    pub fn encoding_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EncodingFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Captured stderr, if the failure carried any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::EncodingFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}

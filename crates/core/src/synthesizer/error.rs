//! Error types for the synthesizer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during speech synthesis.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Nothing to speak.
    #[error("Text is empty")]
    EmptyText,

    /// The engine binary is not installed.
    #[error("Speech engine not found at path: {path}")]
    EngineNotFound { path: PathBuf },

    /// The engine exited unsuccessfully.
    #[error("Speech engine failed: {reason}")]
    EngineFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The engine reported success but produced no audio.
    #[error("Speech engine produced no audio at {path}")]
    EmptyOutput { path: PathBuf },

    /// Backend misconfiguration.
    #[error("Invalid synthesizer configuration: {reason}")]
    Config { reason: String },

    /// Transport failure talking to a remote backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote backend answered with an error status.
    #[error("Speech API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    pub fn engine_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EngineFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

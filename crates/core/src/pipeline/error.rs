//! Error types for the pipeline module.

use thiserror::Error;

use super::request::RequestError;
use crate::encoder::EncoderError;
use crate::fetcher::FetchError;
use crate::synthesizer::SynthesisError;
use crate::workspace::WorkspaceError;

/// Terminal outcome of a failed pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The payload failed validation. No delegate ran.
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    /// The image could not be fetched or is not a decodable image.
    #[error("Invalid image source: {reason}")]
    InvalidImageSource {
        reason: String,
        #[source]
        source: Option<FetchError>,
    },

    /// Speech synthesis failed or timed out.
    #[error("TTS failed: {reason}")]
    TtsFailure {
        reason: String,
        #[source]
        source: Option<SynthesisError>,
    },

    /// Video encoding failed or timed out.
    #[error("Encoding failed: {reason}")]
    EncodingFailure {
        reason: String,
        #[source]
        source: Option<EncoderError>,
    },

    /// No admission slot was free.
    #[error("Too many concurrent requests")]
    Busy,

    /// The request was cancelled, usually by shutdown.
    #[error("Request cancelled")]
    Cancelled,

    /// Anything else, e.g. the workspace is unwritable.
    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl PipelineError {
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// HTTP status for this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) | Self::InvalidImageSource { .. } => 400,
            Self::Busy | Self::Cancelled => 503,
            Self::TtsFailure { .. } | Self::EncodingFailure { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Value of the `error` field in the response body.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(e) => e.error_code(),
            Self::InvalidImageSource { .. } => "Invalid Image Source",
            Self::TtsFailure { .. } => "TTS Conversion Failed",
            Self::EncodingFailure { .. } => "Video Generation Failed",
            Self::Busy => "Server Busy",
            Self::Cancelled => "Request Cancelled",
            Self::Internal { .. } => "Internal Server Error",
        }
    }

    /// Client-facing message. `expose_details` includes the internal cause
    /// for `Internal` errors.
    pub fn message(&self, expose_details: bool) -> String {
        match self {
            Self::InvalidRequest(e) => e.message().to_string(),
            Self::InvalidImageSource { .. } => {
                "Could not download a valid image from image_url".to_string()
            }
            Self::TtsFailure { .. } => "Could not convert text to speech".to_string(),
            Self::EncodingFailure { .. } => "Could not create video with audio".to_string(),
            Self::Busy => "Too many videos are being generated, try again later".to_string(),
            Self::Cancelled => "The server is shutting down".to_string(),
            Self::Internal { reason } if expose_details => reason.clone(),
            Self::Internal { .. } => "An unexpected error occurred".to_string(),
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidImageSource { .. } => "invalid_image_source",
            Self::TtsFailure { .. } => "tts_failure",
            Self::EncodingFailure { .. } => "encoding_failure",
            Self::Busy => "busy",
            Self::Cancelled => "cancelled",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<FetchError> for PipelineError {
    fn from(e: FetchError) -> Self {
        Self::InvalidImageSource {
            reason: e.to_string(),
            source: Some(e),
        }
    }
}

impl From<SynthesisError> for PipelineError {
    fn from(e: SynthesisError) -> Self {
        Self::TtsFailure {
            reason: e.to_string(),
            source: Some(e),
        }
    }
}

impl From<EncoderError> for PipelineError {
    fn from(e: EncoderError) -> Self {
        let reason = match e.stderr() {
            Some(stderr) => format!("{}: {}", e, stderr),
            None => e.to_string(),
        };
        Self::EncodingFailure {
            reason,
            source: Some(e),
        }
    }
}

impl From<WorkspaceError> for PipelineError {
    fn from(e: WorkspaceError) -> Self {
        Self::internal(e.to_string())
    }
}

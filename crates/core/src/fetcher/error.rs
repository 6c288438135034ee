//! Error types for the fetcher module.

use thiserror::Error;

/// Errors that can occur while fetching and validating an image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL was rejected before any request was made.
    #[error("URL not allowed: {reason}")]
    Blocked { reason: String },

    /// The host name could not be resolved.
    #[error("Failed to resolve host {host}: {reason}")]
    Resolve { host: String, reason: String },

    /// Connection, TLS, redirect or body transfer failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Image server returned HTTP {status}")]
    Status { status: u16 },

    /// The response is not declared as an image.
    #[error("URL does not point to an image (content-type: {content_type:?})")]
    NotAnImage { content_type: String },

    /// The body exceeded the configured limit.
    #[error("Image exceeds the {limit_bytes} byte limit")]
    TooLarge { limit_bytes: u64 },

    /// The downloaded bytes are not a decodable image.
    #[error("Downloaded file is not a valid image: {reason}")]
    InvalidImage { reason: String },

    /// I/O error while persisting the body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
        }
    }
}

//! Request payload validation.

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// Frame rate used when the request omits `fps`.
pub const DEFAULT_FPS: u32 = 30;

/// Highest frame rate accepted.
pub const MAX_FPS: u32 = 120;

/// Longest voice name accepted.
pub const MAX_VOICE_LEN: usize = 64;

/// A validated `/generate-video` request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateVideoRequest {
    /// Text to speak, non-empty after trimming.
    pub text: String,
    /// Absolute http(s) URL of the source image.
    pub image_url: Url,
    /// Optional clip length cap in seconds.
    pub duration: Option<f64>,
    pub fps: u32,
    /// Per-request voice or language, e.g. `es` for espeak or `nova` for
    /// openai. Overrides the configured voice.
    pub voice: Option<String>,
}

/// Why a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid JSON format")]
    InvalidJson,
    #[error("Missing text parameter")]
    MissingText,
    #[error("Missing image_url parameter")]
    MissingImageUrl,
    #[error("Invalid image_url parameter")]
    InvalidImageUrl,
    #[error("Invalid duration parameter")]
    InvalidDuration,
    #[error("Invalid fps parameter")]
    InvalidFps,
    #[error("Invalid voice parameter")]
    InvalidVoice,
}

impl RequestError {
    /// Value of the `error` field in the response body.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidJson => "Invalid JSON format",
            Self::MissingText => "Missing text parameter",
            Self::MissingImageUrl => "Missing image_url parameter",
            Self::InvalidImageUrl => "Invalid image_url parameter",
            Self::InvalidDuration => "Invalid duration parameter",
            Self::InvalidFps => "Invalid fps parameter",
            Self::InvalidVoice => "Invalid voice parameter",
        }
    }

    /// Human readable hint for the client.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidJson => "Please provide JSON data",
            Self::MissingText => "Please provide text for TTS conversion",
            Self::MissingImageUrl => "Please provide image URL",
            Self::InvalidImageUrl => "image_url must be an absolute http or https URL",
            Self::InvalidDuration => "duration must be a positive number of seconds",
            Self::InvalidFps => "fps must be a positive integer no greater than 120",
            Self::InvalidVoice => {
                "voice must be up to 64 letters, digits, '.', '_', '+' or '-', not starting with '-'"
            }
        }
    }
}

impl GenerateVideoRequest {
    /// Parses and validates a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)?;
        match value {
            Value::Object(map) => Self::from_map(&map),
            _ => Err(RequestError::InvalidJson),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, RequestError> {
        let text = match present(map, "text") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => return Err(RequestError::MissingText),
        };

        let image_url = match present(map, "image_url") {
            None => return Err(RequestError::MissingImageUrl),
            Some(Value::String(s)) => parse_image_url(s)?,
            Some(_) => return Err(RequestError::InvalidImageUrl),
        };

        let duration = match present(map, "duration") {
            None => None,
            Some(v) => match v.as_f64() {
                Some(d) if d.is_finite() && d > 0.0 => Some(d),
                _ => return Err(RequestError::InvalidDuration),
            },
        };

        let fps = match present(map, "fps") {
            None => DEFAULT_FPS,
            Some(v) => match v.as_u64() {
                Some(n) if n > 0 && n <= u64::from(MAX_FPS) => n as u32,
                _ => return Err(RequestError::InvalidFps),
            },
        };

        // `language` is accepted as an alias; `voice` wins when both are set.
        let voice = match present(map, "voice").or_else(|| present(map, "language")) {
            None => None,
            Some(Value::String(s)) => Some(parse_voice(s)?),
            Some(_) => return Err(RequestError::InvalidVoice),
        };

        Ok(Self {
            text,
            image_url,
            duration,
            fps,
            voice,
        })
    }
}

/// Looks up a key, treating JSON `null` as absent.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn parse_image_url(raw: &str) -> Result<Url, RequestError> {
    let url = Url::parse(raw.trim()).map_err(|_| RequestError::InvalidImageUrl)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(RequestError::InvalidImageUrl);
    }
    Ok(url)
}

fn parse_voice(raw: &str) -> Result<String, RequestError> {
    let voice = raw.trim();
    let valid = !voice.is_empty()
        && voice.len() <= MAX_VOICE_LEN
        && !voice.starts_with('-')
        && voice
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-'));
    if valid {
        Ok(voice.to_string())
    } else {
        Err(RequestError::InvalidVoice)
    }
}

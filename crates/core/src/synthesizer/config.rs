//! Configuration for the synthesizer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Available speech backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesizerBackend {
    #[default]
    Espeak,
    Openai,
}

impl SynthesizerBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Espeak => "espeak",
            Self::Openai => "openai",
        }
    }
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    #[serde(default)]
    pub backend: SynthesizerBackend,

    /// Deadline for one synthesis call in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub espeak: EspeakConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,
}

fn default_timeout() -> u64 {
    60
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            backend: SynthesizerBackend::default(),
            timeout_secs: default_timeout(),
            espeak: EspeakConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

/// espeak-ng subprocess backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspeakConfig {
    /// Path to the espeak-ng binary.
    #[serde(default = "default_espeak_binary")]
    pub binary: PathBuf,
    /// Voice name (`-v`), e.g. "en-us" or "es".
    #[serde(default)]
    pub voice: Option<String>,
    /// Speaking rate in words per minute (`-s`).
    #[serde(default)]
    pub rate_wpm: Option<u32>,
}

fn default_espeak_binary() -> PathBuf {
    PathBuf::from("espeak-ng")
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            binary: default_espeak_binary(),
            voice: None,
            rate_wpm: None,
        }
    }
}

/// OpenAI-compatible HTTP backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL (the `/audio/speech` path is appended).
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Bearer token.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_voice")]
    pub voice: String,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "tts-1".to_string()
}

fn default_openai_voice() -> String {
    "alloy".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: None,
            model: default_openai_model(),
            voice: default_openai_voice(),
        }
    }
}

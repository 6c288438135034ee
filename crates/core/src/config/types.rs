use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::encoder::EncoderConfig;
use crate::fetcher::FetcherConfig;
use crate::pipeline::PipelineConfig;
use crate::synthesizer::{SynthesizerBackend, SynthesizerConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Echo internal error causes back to clients.
    #[serde(default)]
    pub expose_error_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            expose_error_details: false,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Scratch workspace configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    /// Root directory shared by all requests. Each request gets its own
    /// subdirectory underneath.
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,
    /// Wipe the root once at startup.
    #[serde(default)]
    pub clear_on_start: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            clear_on_start: false,
        }
    }
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("vidspeak")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
    pub pipeline: PipelineConfig,
    pub fetcher: FetcherConfig,
    pub synthesizer: SanitizedSynthesizerConfig,
    pub encoder: EncoderConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSynthesizerConfig {
    pub backend: String,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let synth = &config.synthesizer;
        let (voice, openai_base_url) = match synth.backend {
            SynthesizerBackend::Espeak => (synth.espeak.voice.clone(), None),
            SynthesizerBackend::Openai => (
                Some(synth.openai.voice.clone()),
                Some(synth.openai.base_url.clone()),
            ),
        };

        Self {
            server: config.server.clone(),
            workspace: config.workspace.clone(),
            pipeline: config.pipeline.clone(),
            fetcher: config.fetcher.clone(),
            synthesizer: SanitizedSynthesizerConfig {
                backend: synth.backend.as_str().to_string(),
                timeout_secs: synth.timeout_secs,
                voice,
                openai_base_url,
                api_key_configured: synth
                    .openai
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            encoder: config.encoder.clone(),
        }
    }
}

//! Configuration for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ffmpeg encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Deadline for one encode in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Value passed to `-loglevel`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Extra arguments inserted before the output path.
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Pass the requested frame rate as `-r`.
    #[serde(default = "default_true")]
    pub honor_fps: bool,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_timeout() -> u64 {
    300
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_timeout(),
            log_level: default_log_level(),
            extra_args: Vec::new(),
            honor_fps: default_true(),
        }
    }
}

impl EncoderConfig {
    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncoderConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.log_level, "error");
        assert!(config.honor_fps);
    }
}

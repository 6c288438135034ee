//! Types for the encoder module.

use std::path::PathBuf;

/// One still-image-plus-audio encode.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    /// Hard cap on clip length in seconds. Without it the audio length wins.
    pub duration_secs: Option<f64>,
    /// Output frame rate.
    pub fps: Option<u32>,
}

impl EncodeJob {
    pub fn new(
        image_path: impl Into<PathBuf>,
        audio_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            audio_path: audio_path.into(),
            output_path: output_path.into(),
            duration_secs: None,
            fps: None,
        }
    }

    pub fn with_duration(mut self, secs: Option<f64>) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_fps(mut self, fps: Option<u32>) -> Self {
        self.fps = fps;
        self
    }
}

/// Output of a successful encode.
#[derive(Debug, Clone)]
pub struct EncodeResult {
    pub output_path: PathBuf,
    pub size_bytes: u64,
    pub duration_ms: u64,
}

//! FFmpeg-based encoder implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use super::config::EncoderConfig;
use super::error::EncoderError;
use super::traits::VideoEncoder;
use super::types::{EncodeJob, EncodeResult};
use crate::process::{stderr_tail, STDERR_TAIL_LINES};

/// Rounds both dimensions up to even numbers, which libx264 with yuv420p requires.
pub const PAD_EVEN_FILTER: &str = "pad=ceil(iw/2)*2:ceil(ih/2)*2";

/// FFmpeg-based encoder implementation.
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Creates a new FFmpeg encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Builds ffmpeg arguments for a looped-still encode.
    pub fn build_args(&self, job: &EncodeJob) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            job.image_path.to_string_lossy().to_string(),
            "-i".to_string(),
            job.audio_path.to_string_lossy().to_string(),
        ];

        if let Some(duration) = job.duration_secs {
            args.push("-t".to_string());
            args.push(duration.to_string());
        }

        args.extend([
            "-c:v".to_string(),
            "libx264".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-vf".to_string(),
            PAD_EVEN_FILTER.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ]);

        if self.config.honor_fps {
            if let Some(fps) = job.fps {
                args.push("-r".to_string());
                args.push(fps.to_string());
            }
        }

        // The looped image is infinite; stop at the end of the audio.
        args.push("-shortest".to_string());
        args.push("-loglevel".to_string());
        args.push(self.config.log_level.clone());
        args.extend(self.config.extra_args.iter().cloned());
        args.push(job.output_path.to_string_lossy().to_string());

        args
    }

    fn map_spawn_error(&self, e: std::io::Error) -> EncoderError {
        if e.kind() == std::io::ErrorKind::NotFound {
            EncoderError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            EncoderError::Io(e)
        }
    }
}

async fn ensure_input(path: &Path) -> Result<(), EncoderError> {
    if tokio::fs::try_exists(path).await? {
        Ok(())
    } else {
        Err(EncoderError::InputNotFound {
            path: path.to_path_buf(),
        })
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn encode(&self, job: &EncodeJob) -> Result<EncodeResult, EncoderError> {
        let start = Instant::now();

        ensure_input(&job.image_path).await?;
        ensure_input(&job.audio_path).await?;

        let args = self.build_args(job);
        debug!(ffmpeg = %self.config.ffmpeg_path.display(), args = ?args, "Running ffmpeg");

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.map_spawn_error(e))?;

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(EncoderError::encoding_failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                stderr_tail(&output.stderr, STDERR_TAIL_LINES),
            ));
        }

        let size_bytes = match tokio::fs::metadata(&job.output_path).await {
            Ok(meta) if meta.len() > 0 => meta.len(),
            _ => {
                return Err(EncoderError::MissingOutput {
                    path: job.output_path.clone(),
                })
            }
        };

        Ok(EncodeResult {
            output_path: job.output_path.clone(),
            size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(EncoderError::encoding_failed(
                "ffmpeg -version failed",
                stderr_tail(&output.stderr, STDERR_TAIL_LINES),
            ));
        }
        Ok(())
    }
}

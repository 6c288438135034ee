//! Video encoder module.
//!
//! Muxes a still image and a speech track into an H.264/AAC MP4.

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EncoderConfig;
pub use error::EncoderError;
pub use ffmpeg::FfmpegEncoder;
pub use traits::VideoEncoder;
pub use types::{EncodeJob, EncodeResult};

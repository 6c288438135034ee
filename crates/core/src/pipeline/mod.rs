//! Video generation pipeline.
//!
//! Validates a request, then drives the fetcher, synthesizer and encoder in
//! order inside a per-request scratch directory. Admission is bounded by a
//! semaphore; each stage has its own deadline and observes cancellation.

mod config;
mod error;
mod orchestrator;
mod request;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use orchestrator::{Delegates, Stage, StageDeadlines, VideoOutput, VideoPipeline};
pub use request::{GenerateVideoRequest, RequestError, DEFAULT_FPS, MAX_FPS, MAX_VOICE_LEN};

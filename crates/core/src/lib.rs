pub mod config;
pub mod encoder;
pub mod fetcher;
pub mod metrics;
pub mod pipeline;
pub mod process;
pub mod synthesizer;
pub mod testing;
pub mod workspace;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use encoder::{EncodeJob, EncoderError, FfmpegEncoder, VideoEncoder};
pub use fetcher::{FetchError, HttpImageFetcher, ImageFetcher};
pub use pipeline::{
    Delegates, GenerateVideoRequest, PipelineConfig, PipelineError, RequestError, StageDeadlines,
    VideoOutput, VideoPipeline,
};
pub use synthesizer::{create_synthesizer, SpeechSynthesizer, SynthesisError};
pub use workspace::{Scratch, WorkItemId, Workspace, WorkspaceError};

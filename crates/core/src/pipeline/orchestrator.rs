//! Request pipeline: admission, fetch, synthesize, encode.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::request::GenerateVideoRequest;
use crate::config::Config;
use crate::encoder::{EncodeJob, VideoEncoder};
use crate::fetcher::ImageFetcher;
use crate::metrics::{
    PIPELINES_IN_FLIGHT, PIPELINE_DURATION, PIPELINE_RUNS, STAGE_DURATION, VIDEO_BYTES,
};
use crate::synthesizer::SpeechSynthesizer;
use crate::workspace::{ArtifactKind, Scratch, Workspace};

/// Pipeline stages that call out to a delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Synthesize,
    Encode,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Synthesize => "synthesize",
            Self::Encode => "encode",
        }
    }
}

/// Per-stage deadlines.
#[derive(Debug, Clone, Copy)]
pub struct StageDeadlines {
    pub fetch: Duration,
    pub synthesize: Duration,
    pub encode: Duration,
}

impl StageDeadlines {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fetch: Duration::from_secs(config.fetcher.timeout_secs),
            synthesize: Duration::from_secs(config.synthesizer.timeout_secs),
            encode: Duration::from_secs(config.encoder.timeout_secs),
        }
    }

    fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Fetch => self.fetch,
            Stage::Synthesize => self.synthesize,
            Stage::Encode => self.encode,
        }
    }
}

impl Default for StageDeadlines {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The delegates a pipeline drives.
#[derive(Clone)]
pub struct Delegates {
    pub fetcher: Arc<dyn ImageFetcher>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub encoder: Arc<dyn VideoEncoder>,
}

/// A finished video, still inside its scratch directory.
///
/// Dropping this removes the scratch directory, so keep it alive until the
/// file has been sent.
#[derive(Debug)]
pub struct VideoOutput {
    pub scratch: Scratch,
    pub video_path: PathBuf,
    pub size_bytes: u64,
}

/// How a single stage ended when it did not succeed.
enum StageError<E> {
    Failed(E),
    TimedOut(Duration),
    Cancelled,
}

impl<E> StageError<E>
where
    PipelineError: From<E>,
{
    fn into_pipeline_error(self, stage: Stage) -> PipelineError {
        match self {
            Self::Failed(e) => PipelineError::from(e),
            Self::Cancelled => PipelineError::Cancelled,
            Self::TimedOut(deadline) => {
                let reason = format!("{} timed out after {:?}", stage.as_str(), deadline);
                match stage {
                    Stage::Fetch => PipelineError::InvalidImageSource {
                        reason,
                        source: None,
                    },
                    Stage::Synthesize => PipelineError::TtsFailure {
                        reason,
                        source: None,
                    },
                    Stage::Encode => PipelineError::EncodingFailure {
                        reason,
                        source: None,
                    },
                }
            }
        }
    }
}

/// Keeps the in-flight gauge accurate on every exit path.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        PIPELINES_IN_FLIGHT.inc();
        Self
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        PIPELINES_IN_FLIGHT.dec();
    }
}

/// Turns a validated request into an MP4.
///
/// Each run gets its own scratch directory. Every delegate call is raced
/// against its stage deadline and the request's cancellation token; the
/// losing future is dropped, which kills any child process it spawned.
pub struct VideoPipeline {
    workspace: Workspace,
    delegates: Delegates,
    config: PipelineConfig,
    deadlines: StageDeadlines,
    admission: Arc<Semaphore>,
}

impl VideoPipeline {
    pub fn new(
        workspace: Workspace,
        delegates: Delegates,
        config: PipelineConfig,
        deadlines: StageDeadlines,
    ) -> Self {
        let admission = Arc::new(Semaphore::new(config.max_concurrent));
        Self {
            workspace,
            delegates,
            config,
            deadlines,
            admission,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Admission slots currently free.
    pub fn available_permits(&self) -> usize {
        self.admission.available_permits()
    }

    /// Runs the pipeline for one request.
    ///
    /// On error the scratch directory has already been removed.
    pub async fn handle(
        &self,
        request: &GenerateVideoRequest,
        cancel: &CancellationToken,
    ) -> Result<VideoOutput, PipelineError> {
        let start = Instant::now();
        let result = self.admit_and_run(request, cancel).await;

        let outcome = match &result {
            Ok(output) => {
                VIDEO_BYTES.observe(output.size_bytes as f64);
                "success"
            }
            Err(e) => e.outcome(),
        };
        PIPELINE_RUNS.with_label_values(&[outcome]).inc();
        PIPELINE_DURATION
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn admit(&self, cancel: &CancellationToken) -> Result<OwnedSemaphorePermit, PipelineError> {
        if let Ok(permit) = self.admission.clone().try_acquire_owned() {
            return Ok(permit);
        }
        if self.config.admission_wait_secs == 0 {
            return Err(PipelineError::Busy);
        }

        let wait = Duration::from_secs(self.config.admission_wait_secs);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
            acquired = tokio::time::timeout(wait, self.admission.clone().acquire_owned()) => {
                match acquired {
                    Ok(Ok(permit)) => Ok(permit),
                    Ok(Err(_)) => Err(PipelineError::internal("admission semaphore closed")),
                    Err(_) => Err(PipelineError::Busy),
                }
            }
        }
    }

    async fn admit_and_run(
        &self,
        request: &GenerateVideoRequest,
        cancel: &CancellationToken,
    ) -> Result<VideoOutput, PipelineError> {
        let _permit = match self.admit(cancel).await {
            Ok(permit) => permit,
            Err(e) => {
                warn!(outcome = e.outcome(), "Request not admitted");
                return Err(e);
            }
        };
        let _in_flight = InFlight::enter();

        let mut scratch = self.workspace.acquire().await?;
        let span = info_span!("pipeline", work_item = %scratch.id());

        let result = self
            .run_stages(request, &mut scratch, cancel)
            .instrument(span.clone())
            .await;

        match result {
            Ok((video_path, size_bytes)) => Ok(VideoOutput {
                scratch,
                video_path,
                size_bytes,
            }),
            Err(e) => {
                scratch.release().instrument(span).await;
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &GenerateVideoRequest,
        scratch: &mut Scratch,
        cancel: &CancellationToken,
    ) -> Result<(PathBuf, u64), PipelineError> {
        let start = Instant::now();
        info!(
            image_url = %request.image_url,
            text_chars = request.text.chars().count(),
            duration = ?request.duration,
            fps = request.fps,
            "Generating video"
        );

        let fetcher = &self.delegates.fetcher;
        let image_stem = scratch.stem(ArtifactKind::Image);
        let image = self
            .run_stage(
                Stage::Fetch,
                cancel,
                fetcher.fetch(&request.image_url, scratch.dir(), &image_stem),
            )
            .await
            .map_err(|e| {
                let e = e.into_pipeline_error(Stage::Fetch);
                warn!(error = %e, "Image download failed");
                e
            })?;
        scratch.track(image.path.clone());
        debug!(
            width = image.width,
            height = image.height,
            content_type = %image.content_type,
            "Image validated"
        );

        let synthesizer = &self.delegates.synthesizer;
        let audio_path =
            scratch.artifact_path(ArtifactKind::Audio, synthesizer.audio_format().extension());
        let audio = self
            .run_stage(
                Stage::Synthesize,
                cancel,
                synthesizer.synthesize(&request.text, request.voice.as_deref(), &audio_path),
            )
            .await
            .map_err(|e| {
                let e = e.into_pipeline_error(Stage::Synthesize);
                error!(synthesizer = synthesizer.name(), error = %e, "TTS failed");
                e
            })?;
        debug!(size_bytes = audio.size_bytes, "Audio synthesized");

        let encoder = &self.delegates.encoder;
        let video_path = scratch.artifact_path(ArtifactKind::Video, "mp4");
        let job = EncodeJob::new(&image.path, &audio.path, &video_path)
            .with_duration(request.duration)
            .with_fps(Some(request.fps));
        let encoded = self
            .run_stage(Stage::Encode, cancel, encoder.encode(&job))
            .await
            .map_err(|e| {
                let e = e.into_pipeline_error(Stage::Encode);
                error!(encoder = encoder.name(), error = %e, "Video encoding failed");
                e
            })?;

        info!(
            size_bytes = encoded.size_bytes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Video generated"
        );

        Ok((encoded.output_path, encoded.size_bytes))
    }

    /// Races one delegate future against its deadline and the cancel token.
    async fn run_stage<T, E, F>(
        &self,
        stage: Stage,
        cancel: &CancellationToken,
        work: F,
    ) -> Result<T, StageError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let deadline = self.deadlines.for_stage(stage);
        let start = Instant::now();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StageError::Cancelled),
            outcome = tokio::time::timeout(deadline, work) => match outcome {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(StageError::Failed(e)),
                Err(_) => Err(StageError::TimedOut(deadline)),
            },
        };

        let label = match &result {
            Ok(_) => "ok",
            Err(StageError::Failed(_)) => "error",
            Err(StageError::TimedOut(_)) => "timeout",
            Err(StageError::Cancelled) => "cancelled",
        };
        STAGE_DURATION
            .with_label_values(&[stage.as_str(), label])
            .observe(start.elapsed().as_secs_f64());

        result
    }
}

//! `POST /generate-video`.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use futures::Stream;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;
use vidspeak_core::{GenerateVideoRequest, PipelineError, Scratch, VideoOutput};

use super::error::ApiError;
use crate::state::AppState;

/// File name offered to the client.
pub const DOWNLOAD_FILENAME: &str = "generated_video.mp4";

/// Streams a file while owning the scratch directory it lives in.
///
/// The directory is removed once the stream is dropped, whether the body
/// finished or the client went away.
struct ScratchFileStream {
    inner: ReaderStream<File>,
    _scratch: Scratch,
}

impl Stream for ScratchFileStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Accepts any content type and parses the body itself, so malformed
/// payloads get the `Invalid JSON format` error body rather than an
/// extractor rejection.
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let expose = state.expose_error_details();

    let request = GenerateVideoRequest::from_slice(&body)
        .map_err(|e| ApiError::new(PipelineError::from(e), expose))?;

    let cancel = state.shutdown_token().child_token();
    let output = state
        .pipeline()
        .handle(&request, &cancel)
        .await
        .map_err(|e| ApiError::new(e, expose))?;

    video_response(output)
        .await
        .map_err(|e| ApiError::new(e, expose))
}

async fn video_response(output: VideoOutput) -> Result<Response, PipelineError> {
    let VideoOutput {
        scratch,
        video_path,
        size_bytes,
    } = output;

    let file = match File::open(&video_path).await {
        Ok(file) => file,
        Err(e) => {
            scratch.release().await;
            return Err(PipelineError::internal(format!(
                "failed to open encoded video: {}",
                e
            )));
        }
    };

    debug!(work_item = %scratch.id(), size_bytes, "Streaming video");

    let stream = ScratchFileStream {
        inner: ReaderStream::new(file),
        _scratch: scratch,
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"))
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
        )
        .header(header::CONTENT_LENGTH, size_bytes)
        .body(Body::from_stream(stream))
        .map_err(|e| PipelineError::internal(format!("failed to build response: {}", e)))
}

//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use vidspeak_core::PipelineError;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// A pipeline error rendered as `{error, message}` with its status code.
#[derive(Debug)]
pub struct ApiError {
    inner: PipelineError,
    expose_details: bool,
}

impl ApiError {
    pub fn new(inner: PipelineError, expose_details: bool) -> Self {
        Self {
            inner,
            expose_details,
        }
    }

    pub fn inner(&self) -> &PipelineError {
        &self.inner
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let PipelineError::Internal { reason } = &self.inner {
            error!(reason = %reason, "Internal error while generating video");
        }

        let status = StatusCode::from_u16(self.inner.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.inner.error_code().to_string(),
            message: self.inner.message(self.expose_details),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use vidspeak_core::RequestError;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_request_error_body() {
        let (status, body) =
            render(ApiError::new(RequestError::MissingText.into(), false)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing text parameter");
        assert_eq!(body["message"], "Please provide text for TTS conversion");
    }

    #[tokio::test]
    async fn test_busy_is_503() {
        let (status, body) = render(ApiError::new(PipelineError::Busy, false)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Server Busy");
    }

    #[tokio::test]
    async fn test_internal_details_follow_flag() {
        let (_, hidden) = render(ApiError::new(PipelineError::internal("boom"), false)).await;
        let (_, shown) = render(ApiError::new(PipelineError::internal("boom"), true)).await;
        assert_eq!(hidden["error"], "Internal Server Error");
        assert_ne!(hidden["message"], "boom");
        assert_eq!(shown["message"], "boom");
    }
}

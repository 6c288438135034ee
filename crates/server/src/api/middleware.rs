//! Metrics middleware for API routes.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{
    normalize_path, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
};

/// Decrements the in-flight gauge even if the handler future is dropped
/// because the client disconnected.
struct InFlightGuard;

impl InFlightGuard {
    fn enter() -> Self {
        HTTP_REQUESTS_IN_FLIGHT.inc();
        Self
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        HTTP_REQUESTS_IN_FLIGHT.dec();
    }
}

/// Records request count, latency and in-flight gauge per route.
///
/// Routes are labelled by their matched template when axum found one, and
/// by the raw path through [`normalize_path`] otherwise. Duration covers the
/// handler only; a streamed video body keeps flowing after this returns.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().as_str().to_owned();
    let route = match request.extensions().get::<MatchedPath>() {
        Some(matched) => normalize_path(matched.as_str()),
        None => normalize_path(request.uri().path()),
    };

    let start = Instant::now();
    let response = {
        let _in_flight = InFlightGuard::enter();
        next.run(request).await
    };

    let status = response.status();
    let labels = [method.as_str(), route.as_str(), status.as_str()];
    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_counts_unknown_routes_under_one_label() {
        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .layer(middleware::from_fn(metrics_middleware));

        let before = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/{other}", "404"])
            .get();
        let request = Request::builder()
            .uri("/does/not/exist")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), 404);
        let after = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/{other}", "404"])
            .get();
        assert!(after > before);
    }
}

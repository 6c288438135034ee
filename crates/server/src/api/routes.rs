use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{generate, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Service routes
    let api_routes = Router::new()
        .route("/generate-video", post(generate::generate_video))
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .with_state(state);

    // Served at the root for existing clients and under /api/v1
    Router::new()
        .merge(api_routes.clone())
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

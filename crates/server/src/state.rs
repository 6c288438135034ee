use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use vidspeak_core::{Config, SanitizedConfig, VideoPipeline};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<VideoPipeline>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, pipeline: Arc<VideoPipeline>, shutdown: CancellationToken) -> Self {
        Self {
            config,
            pipeline,
            shutdown,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &VideoPipeline {
        self.pipeline.as_ref()
    }

    /// Cancelled when the server begins shutting down. Requests derive
    /// child tokens from it.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn expose_error_details(&self) -> bool {
        self.config.server.expose_error_details
    }
}

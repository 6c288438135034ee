use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidspeak_core::{
    create_synthesizer, load_config, validate_config, Delegates, FfmpegEncoder, HttpImageFetcher,
    ImageFetcher, SpeechSynthesizer, StageDeadlines, VideoEncoder, VideoPipeline, Workspace,
};
use vidspeak_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let json = std::env::var("VIDSPEAK_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

async fn run() -> Result<()> {
    // Initialize logging
    init_logging();
    info!("vidspeak {}", VERSION);

    // Determine config path. An explicit path must exist.
    let explicit = std::env::var("VIDSPEAK_CONFIG").ok().map(PathBuf::from);
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path, explicit.is_some())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Synthesizer backend: {}", config.synthesizer.backend.as_str());
    info!("Workspace root: {:?}", config.workspace.root);

    // Scratch workspace
    let workspace = Workspace::open(&config.workspace.root)
        .await
        .context("Failed to open workspace")?;
    if config.workspace.clear_on_start {
        workspace.clear().await.context("Failed to clear workspace")?;
    }

    // Delegates
    let fetcher: Arc<dyn ImageFetcher> = Arc::new(
        HttpImageFetcher::new(config.fetcher.clone()).context("Failed to create image fetcher")?,
    );
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::from(
        create_synthesizer(&config.synthesizer).context("Failed to create synthesizer")?,
    );
    let encoder: Arc<dyn VideoEncoder> = Arc::new(FfmpegEncoder::new(config.encoder.clone()));

    // A missing engine is reported but not fatal; requests fail with 500 until fixed.
    match synthesizer.validate().await {
        Ok(()) => info!("Using synthesizer: {}", synthesizer.name()),
        Err(e) => warn!("Synthesizer {} is not usable: {}", synthesizer.name(), e),
    }
    match encoder.validate().await {
        Ok(()) => info!("Using encoder: {}", encoder.name()),
        Err(e) => warn!("Encoder {} is not usable: {}", encoder.name(), e),
    }

    let pipeline = Arc::new(VideoPipeline::new(
        workspace,
        Delegates {
            fetcher,
            synthesizer,
            encoder,
        },
        config.pipeline.clone(),
        StageDeadlines::from_config(&config),
    ));
    info!(
        "Pipeline ready (max {} concurrent)",
        config.pipeline.max_concurrent
    );

    // Cancelled on shutdown so in-flight delegates stop promptly
    let shutdown = CancellationToken::new();

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), pipeline, shutdown.clone()));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown requested, cancelling in-flight requests");
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

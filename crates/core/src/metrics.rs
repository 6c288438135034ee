//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Pipeline runs and their outcomes
//! - Per-stage latency (fetch, synthesize, encode)
//! - Admission (pipelines in flight)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Pipeline runs total by outcome.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidspeak_pipeline_runs_total", "Total pipeline runs"),
        &["outcome"], // "success", "invalid_image_source", "tts_failure", ...
    )
    .unwrap()
});

/// End-to-end pipeline duration in seconds (admission to encoded file).
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidspeak_pipeline_duration_seconds",
            "Duration of a pipeline run",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidspeak_stage_duration_seconds",
            "Duration of a single pipeline stage",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["stage", "result"], // result: "ok", "error", "timeout", "cancelled"
    )
    .unwrap()
});

/// Pipelines currently holding an admission permit.
pub static PIPELINES_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vidspeak_pipelines_in_flight",
        "Number of pipelines currently running",
    )
    .unwrap()
});

/// Size of encoded videos in bytes.
pub static VIDEO_BYTES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("vidspeak_video_bytes", "Size of generated videos")
            .buckets(prometheus::exponential_buckets(64.0 * 1024.0, 4.0, 8).unwrap()),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PIPELINE_RUNS.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(STAGE_DURATION.clone()),
        Box::new(PIPELINES_IN_FLIGHT.clone()),
        Box::new(VIDEO_BYTES.clone()),
    ]
}

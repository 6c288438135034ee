//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};

/// Admission control settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum pipelines running at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// How long a request waits for a free slot. 0 rejects immediately.
    #[serde(default)]
    pub admission_wait_secs: u64,
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            admission_wait_secs: 0,
        }
    }
}

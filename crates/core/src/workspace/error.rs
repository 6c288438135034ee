//! Error types for the workspace module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing scratch storage.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The workspace root could not be created.
    #[error("Failed to create workspace root {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workspace root could not be cleared.
    #[error("Failed to clear workspace root {path}: {source}")]
    Clear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A per-request scratch directory could not be created.
    #[error("Failed to create scratch directory {path}: {source}")]
    CreateScratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Request-scoped scratch storage.
//!
//! A [`Workspace`] owns one root directory shared by the whole process. Each
//! request calls [`Workspace::acquire`] and receives a [`Scratch`]: a fresh
//! subdirectory named after a random [`WorkItemId`]. Every artifact a request
//! produces lives in its own scratch directory, and the directory is removed
//! when the scratch is released or dropped.

mod error;
mod scratch;

pub use error::WorkspaceError;
pub use scratch::{ArtifactKind, Scratch, WorkItemId};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maximum attempts to find an unused scratch directory name.
const ACQUIRE_ATTEMPTS: usize = 3;

/// The process-wide scratch root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Opens the workspace, creating the root directory if it is absent.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| WorkspaceError::CreateRoot {
                path: root.clone(),
                source,
            })?;
        debug!(root = %root.display(), "Workspace ready");
        Ok(Self { root })
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deletes and recreates the whole root directory.
    ///
    /// This discards every in-flight scratch, so it must only run while no
    /// pipeline is active (at startup).
    pub async fn clear(&self) -> Result<(), WorkspaceError> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(WorkspaceError::Clear {
                    path: self.root.clone(),
                    source,
                })
            }
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| WorkspaceError::CreateRoot {
                path: self.root.clone(),
                source,
            })?;
        info!(root = %self.root.display(), "Workspace cleared");
        Ok(())
    }

    /// Allocates a new scratch directory for one request.
    pub async fn acquire(&self) -> Result<Scratch, WorkspaceError> {
        let mut last_err = None;

        for _ in 0..ACQUIRE_ATTEMPTS {
            let id = WorkItemId::generate();
            let dir = self.root.join(id.as_str());

            // create_dir (not create_dir_all) so an existing directory is
            // never adopted by a second request.
            match tokio::fs::create_dir(&dir).await {
                Ok(()) => return Ok(Scratch::new(id, dir)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    last_err = Some(e);
                }
                Err(source) => return Err(WorkspaceError::CreateScratch { path: dir, source }),
            }
        }

        Err(WorkspaceError::CreateScratch {
            path: self.root.clone(),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::AlreadyExists, "scratch name collision")
            }),
        })
    }
}

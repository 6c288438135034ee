//! Per-request scratch directory handle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Unique per-request token used to namespace temporary files.
///
/// 128 random bits rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(String);

impl WorkItemId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kinds of temporary files a request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// The downloaded source image.
    Image,
    /// Synthesized speech.
    Audio,
    /// The encoded clip.
    Video,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exclusive scratch directory owned by one request.
///
/// Call [`Scratch::release`] on normal exit paths. If the handle is dropped
/// without being released (the request future was cancelled, or the response
/// body finished streaming), the directory is removed synchronously in `Drop`.
#[derive(Debug)]
pub struct Scratch {
    id: WorkItemId,
    dir: PathBuf,
    artifacts: Vec<PathBuf>,
    released: bool,
}

impl Scratch {
    pub(super) fn new(id: WorkItemId, dir: PathBuf) -> Self {
        Self {
            id,
            dir,
            artifacts: Vec::new(),
            released: false,
        }
    }

    pub fn id(&self) -> &WorkItemId {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file stem for an artifact kind, `{id}_{kind}`.
    pub fn stem(&self, kind: ArtifactKind) -> String {
        format!("{}_{}", self.id, kind)
    }

    /// Derives and tracks the path `{dir}/{id}_{kind}.{ext}`.
    pub fn artifact_path(&mut self, kind: ArtifactKind, ext: &str) -> PathBuf {
        let path = self.dir.join(format!("{}.{}", self.stem(kind), ext));
        self.track(path.clone());
        path
    }

    /// Tracks a path created inside this scratch by a delegate.
    pub fn track(&mut self, path: PathBuf) {
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path);
        }
    }

    /// Paths tracked so far.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Deletes every tracked artifact, then the directory itself.
    ///
    /// Each deletion is best-effort: failures are logged and skipped.
    pub async fn release(mut self) {
        for path in &self.artifacts {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => debug!(path = %path.display(), error = %e, "Failed to remove artifact"),
            }
        }
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(dir = %self.dir.display(), error = %e, "Failed to remove scratch directory");
            }
        }
        self.released = true;
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let dir = std::mem::take(&mut self.dir);
        match tokio::runtime::Handle::try_current() {
            // Drop often runs on a runtime worker when a response stream ends.
            Ok(handle) => {
                handle.spawn_blocking(move || remove_quietly(&dir));
            }
            Err(_) => remove_quietly(&dir),
        }
    }
}

fn remove_quietly(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(dir = %dir.display(), error = %e, "Failed to remove scratch directory on drop");
        }
    }
}

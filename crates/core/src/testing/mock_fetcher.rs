//! Mock image fetcher for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use super::fixtures;
use crate::fetcher::{FetchError, FetchedImage, ImageFetcher};

/// Mock implementation of the ImageFetcher trait.
///
/// Writes a generated PNG to the requested path instead of downloading.
#[derive(Debug)]
pub struct MockImageFetcher {
    /// URLs requested, in order.
    fetches: Arc<RwLock<Vec<Url>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// Dimensions of the generated image.
    size: Arc<RwLock<(u32, u32)>>,
    /// Simulated download time.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageFetcher {
    /// Create a new mock fetcher producing 16x16 images.
    pub fn new() -> Self {
        Self {
            fetches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            size: Arc::new(RwLock::new((16, 16))),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all requested URLs.
    pub async fn fetched_urls(&self) -> Vec<Url> {
        self.fetches.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// Make the next fetch fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the dimensions of generated images.
    pub async fn set_size(&self, width: u32, height: u32) {
        *self.size.write().await = (width, height);
    }

    /// Delay each fetch, e.g. to test deadlines.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(
        &self,
        url: &Url,
        dest_dir: &Path,
        stem: &str,
    ) -> Result<FetchedImage, FetchError> {
        self.fetches.write().await.push(url.clone());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let (width, height) = *self.size.read().await;
        let bytes = fixtures::png_bytes(width, height);
        let path = dest_dir.join(format!("{}.png", stem));
        tokio::fs::write(&path, &bytes).await?;

        Ok(FetchedImage {
            path,
            content_type: "image/png".to_string(),
            extension: "png".to_string(),
            width,
            height,
            size_bytes: bytes.len() as u64,
        })
    }
}

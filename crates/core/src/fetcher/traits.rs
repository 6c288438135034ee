//! Trait definitions for the fetcher module.

use async_trait::async_trait;
use std::path::Path;
use url::Url;

use super::error::FetchError;
use super::types::FetchedImage;

/// Downloads and validates a remote image.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches `url` into `dest_dir/{stem}.{ext}` and validates it.
    ///
    /// The extension is derived from the response content type. On any
    /// failure after the file was created, the file is removed before the
    /// error is returned.
    async fn fetch(&self, url: &Url, dest_dir: &Path, stem: &str)
        -> Result<FetchedImage, FetchError>;
}

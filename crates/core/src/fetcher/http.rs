//! reqwest-based image fetcher.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use super::config::FetcherConfig;
use super::error::FetchError;
use super::guard::{PublicOnlyResolver, ResolveError, UrlGuard};
use super::traits::ImageFetcher;
use super::types::{extension_for_content_type, is_image_content_type, FetchedImage};

/// Fetches images over HTTP(S) with a streamed body.
pub struct HttpImageFetcher {
    config: FetcherConfig,
    client: reqwest::Client,
    guard: UrlGuard,
}

impl HttpImageFetcher {
    /// Creates a fetcher, building the HTTP client once.
    ///
    /// Unless private networks are allowed, host names are resolved through
    /// [`PublicOnlyResolver`].
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let resolver = (!config.allow_private_networks).then_some(PublicOnlyResolver);
        Self::build(config, resolver)
    }

    fn build(
        config: FetcherConfig,
        resolver: Option<PublicOnlyResolver>,
    ) -> Result<Self, FetchError> {
        let guard = UrlGuard::new(&config);
        let redirect_guard = guard.clone();
        let max_redirects = config.max_redirects;

        let redirect = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= max_redirects {
                return attempt.error(format!("more than {} redirects", max_redirects));
            }
            match redirect_guard.check_static(attempt.url()) {
                Ok(()) => attempt.follow(),
                Err(reason) => attempt.error(reason),
            }
        });

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(redirect);
        if let Some(resolver) = resolver {
            builder = builder.dns_resolver(Arc::new(resolver));
        }
        let client = builder.build()?;

        Ok(Self {
            config,
            client,
            guard,
        })
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    /// Streams the response body to `path`, enforcing the size limit.
    async fn persist(&self, response: reqwest::Response, path: &Path) -> Result<u64, FetchError> {
        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.config.max_bytes {
                return Err(FetchError::TooLarge {
                    limit_bytes: self.config.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(written)
    }

    /// Decodes the persisted file on the blocking pool.
    async fn decode(path: PathBuf) -> Result<(u32, u32), FetchError> {
        tokio::task::spawn_blocking(move || -> Result<(u32, u32), FetchError> {
            let reader = image::ImageReader::open(&path)?
                .with_guessed_format()
                .map_err(|e| FetchError::invalid_image(e.to_string()))?;
            let decoded = reader
                .decode()
                .map_err(|e| FetchError::invalid_image(e.to_string()))?;
            Ok((decoded.width(), decoded.height()))
        })
        .await
        .map_err(|e| FetchError::invalid_image(format!("decoder task failed: {}", e)))?
    }
}

/// Surfaces a refusal from [`PublicOnlyResolver`] buried in a client error.
fn classify_send_error(e: reqwest::Error) -> FetchError {
    let mut cause = e.source();
    while let Some(err) = cause {
        if let Some(resolve) = err.downcast_ref::<ResolveError>() {
            return match resolve {
                ResolveError::NonPublic { .. } => FetchError::blocked(resolve.to_string()),
                ResolveError::NoAddresses { host } | ResolveError::Lookup { host, .. } => {
                    FetchError::Resolve {
                        host: host.clone(),
                        reason: resolve.to_string(),
                    }
                }
            };
        }
        cause = err.source();
    }
    FetchError::Http(e)
}

/// Removes a partially written file, ignoring errors.
async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "Failed to remove partial image");
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(
        &self,
        url: &Url,
        dest_dir: &Path,
        stem: &str,
    ) -> Result<FetchedImage, FetchError> {
        self.guard.check_static(url).map_err(FetchError::blocked)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !is_image_content_type(&content_type) {
            return Err(FetchError::NotAnImage { content_type });
        }

        if let Some(len) = response.content_length() {
            if len > self.config.max_bytes {
                return Err(FetchError::TooLarge {
                    limit_bytes: self.config.max_bytes,
                });
            }
        }

        let extension = extension_for_content_type(&content_type);
        let path = dest_dir.join(format!("{}.{}", stem, extension));

        let size_bytes = match self.persist(response, &path).await {
            Ok(n) => n,
            Err(e) => {
                discard(&path).await;
                return Err(e);
            }
        };

        let (width, height) = match Self::decode(path.clone()).await {
            Ok(dims) => dims,
            Err(e) => {
                warn!(url = %url, error = %e, "Downloaded file failed image validation");
                discard(&path).await;
                return Err(e);
            }
        };

        debug!(
            url = %url,
            path = %path.display(),
            width,
            height,
            size_bytes,
            "Image fetched"
        );

        Ok(FetchedImage {
            path,
            content_type,
            extension,
            width,
            height,
            size_bytes,
        })
    }
}

//! Image fetcher module.
//!
//! Downloads a caller-supplied image URL into a scratch directory and
//! verifies that the result is a decodable image.
//!
//! # Example
//!
//! ```ignore
//! use vidspeak_core::fetcher::{FetcherConfig, HttpImageFetcher, ImageFetcher};
//!
//! let fetcher = HttpImageFetcher::new(FetcherConfig::default())?;
//! let url = url::Url::parse("https://images.example.com/cat.png")?;
//! let image = fetcher.fetch(&url, scratch.dir(), "0123_image").await?;
//! println!("{}x{} {}", image.width, image.height, image.content_type);
//! ```

mod config;
mod error;
mod guard;
mod http;
mod traits;
mod types;

pub use config::FetcherConfig;
pub use error::FetchError;
pub use guard::{is_blocked_ip, resolve_public, PublicOnlyResolver, ResolveError, UrlGuard};
pub use http::HttpImageFetcher;
pub use traits::ImageFetcher;
pub use types::{extension_for_content_type, is_image_content_type, FetchedImage};

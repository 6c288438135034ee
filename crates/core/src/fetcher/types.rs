//! Types for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Extension used when the content type carries no usable subtype.
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// A downloaded and validated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedImage {
    /// Where the image was persisted.
    pub path: PathBuf,
    /// `content-type` as sent by the server.
    pub content_type: String,
    /// Extension derived from the content type.
    pub extension: String,
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
    /// Bytes written to disk.
    pub size_bytes: u64,
}

/// Returns the lowercased media type without parameters.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Whether a `content-type` header value declares an image.
///
/// A bare `image` with no subtype counts; its extension falls back to
/// [`DEFAULT_IMAGE_EXTENSION`].
pub fn is_image_content_type(content_type: &str) -> bool {
    let mime = essence(content_type);
    mime == "image" || mime.starts_with("image/")
}

/// Derives a file extension from a `content-type` header value.
///
/// `image/jpeg; charset=binary` becomes `jpg`, `image/svg+xml` becomes `svg`,
/// `image/x-icon` becomes `icon`; anything without a usable subtype becomes
/// `png`.
pub fn extension_for_content_type(content_type: &str) -> String {
    let mime = essence(content_type);
    let subtype = mime.split_once('/').map(|(_, s)| s).unwrap_or("");
    let subtype = subtype.split('+').next().unwrap_or("");
    let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);

    match subtype {
        "jpeg" | "pjpeg" => "jpg".to_string(),
        s if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()) => s.to_string(),
        _ => DEFAULT_IMAGE_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_content_type() {
        assert!(is_image_content_type("image/png"));
        assert!(is_image_content_type("IMAGE/JPEG; charset=binary"));
        assert!(!is_image_content_type("application/json"));
        assert!(!is_image_content_type("text/html; charset=utf-8"));
        assert!(!is_image_content_type(""));
    }

    #[test]
    fn test_bare_image_content_type_is_accepted() {
        assert!(is_image_content_type("image"));
        assert!(is_image_content_type("Image; charset=binary"));
        assert!(!is_image_content_type("images"));
        assert!(!is_image_content_type("application/image"));
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type("image/png"), "png");
        assert_eq!(extension_for_content_type("image/jpeg"), "jpg");
        assert_eq!(extension_for_content_type("image/webp; q=1"), "webp");
        assert_eq!(extension_for_content_type("image/svg+xml"), "svg");
        assert_eq!(extension_for_content_type("image/x-ms-bmp"), "png");
        assert_eq!(extension_for_content_type("image/x-icon"), "icon");
    }

    #[test]
    fn test_extension_defaults_to_png() {
        assert_eq!(extension_for_content_type("image"), "png");
        assert_eq!(extension_for_content_type("image/"), "png");
        assert_eq!(extension_for_content_type("image/../etc"), "png");
        assert_eq!(extension_for_content_type(""), "png");
    }
}

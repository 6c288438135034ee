//! Testing utilities and mock implementations.
//!
//! Mock delegates for the pipeline, so the full request path can be tested
//! without network access, ffmpeg, or a speech engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use vidspeak_core::testing::{MockEncoder, MockImageFetcher, MockSynthesizer};
//!
//! let fetcher = MockImageFetcher::new();
//! let synthesizer = MockSynthesizer::new();
//! let encoder = MockEncoder::new();
//!
//! // Make the next synthesis fail
//! synthesizer.set_next_error(SynthesisError::EmptyText).await;
//!
//! // Use in a VideoPipeline...
//! ```

mod mock_encoder;
mod mock_fetcher;
mod mock_synthesizer;

pub use mock_encoder::{MockEncoder, MOCK_VIDEO_BYTES};
pub use mock_fetcher::MockImageFetcher;
pub use mock_synthesizer::MockSynthesizer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;
    use std::path::{Path, PathBuf};

    /// Encode a solid-colour PNG of the given size.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png)
            .expect("encoding an in-memory PNG cannot fail");
        buf.into_inner()
    }

    /// A minimal WAV header followed by a few silent samples.
    pub fn wav_bytes() -> Vec<u8> {
        let samples: u32 = 16;
        let data_len = samples * 2;
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&22050u32.to_le_bytes());
        out.extend_from_slice(&44100u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.resize(44 + data_len as usize, 0);
        out
    }

    /// Wait up to two seconds for `dir` to have no entries.
    ///
    /// Dropped scratch directories are removed on the blocking pool, so
    /// cleanup can land shortly after the owning value goes away.
    pub async fn wait_for_empty_dir(dir: &Path) -> bool {
        for _ in 0..200 {
            let empty = match std::fs::read_dir(dir) {
                Ok(mut entries) => entries.next().is_none(),
                Err(_) => true,
            };
            if empty {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        false
    }

    /// Write an executable `/bin/sh` script and return its path.
    #[cfg(unix)]
    pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
        path
    }
}

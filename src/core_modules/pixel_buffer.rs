// THEORY:
// The `PixelBuffer` is the Image Source of the analysis engine: the single place
// where bytes on disk become pixels in memory. Every later stage works on a
// `PixelBuffer` and nothing else touches the filesystem.
//
// Key architectural principles:
// 1.  **Fail Once, Early**: Existence is checked before any read, decodability
//     right after. Both failures are terminal for the request and are reported as
//     structural `AnalysisError`s; no classifier ever sees a half-loaded image.
// 2.  **Immutable & Shared**: The decoded RGB image sits behind an `Arc`. Cloning a
//     buffer is a reference-count bump, so every classifier (and every worker
//     thread) can hold the same pixels without copying or locking them.
// 3.  **Normalized Input**: Alpha is dropped and deeper bit depths are reduced to 8
//     bits per channel, so downstream math only ever sees 3 x u8.

use std::path::Path;
use std::sync::Arc;

use image::{ImageError, ImageReader, RgbImage};
use tracing::debug;

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::{AnalysisError, Result};

/// An immutable, cheaply clonable RGB pixel grid.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    image: Arc<RgbImage>,
}

impl PixelBuffer {
    /// Loads and decodes the image at `path`.
    ///
    /// The format is sniffed from the file contents first and falls back to the
    /// extension, so a text file renamed to `.jpg` fails as a decode error rather
    /// than being misread.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AnalysisError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let decoded = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(ImageError::IoError)
            .and_then(|reader| reader.decode())
            .map_err(|source| AnalysisError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(AnalysisError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        debug!(
            path = %path.display(),
            width = decoded.width(),
            height = decoded.height(),
            color = ?decoded.color(),
            "decoded image"
        );
        Ok(Self::from_rgb(decoded.to_rgb8()))
    }

    /// Wraps pixels that are already in memory.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        self.image.width() as usize * self.image.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Row-major iterator over the buffer's pixels.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.image.pixels().map(|rgb| Pixel::from(*rgb))
    }
}

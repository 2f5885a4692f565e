use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::classifiers::Attribute;

/// Structural failures of an analysis request.
///
/// The `Display` text of the two structural kinds is exactly the message the
/// request layer hands back to clients.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The path does not resolve to an existing file. Nothing was read.
    #[error("Image file not found")]
    NotFound { path: PathBuf },

    /// The file exists but is not a decodable raster image.
    #[error("Invalid image")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The file decoded to an image with no pixels.
    #[error("Invalid image")]
    EmptyImage { path: PathBuf },

    #[error("no classifier produced a `{}` label", .0.key())]
    MissingAttribute(Attribute),

    /// A pool worker or blocking task went away before answering.
    #[error("analysis worker failed: {0}")]
    Worker(String),
}

impl AnalysisError {
    /// The message for the `{"error": ...}` mapping.
    pub fn client_message(&self) -> String {
        self.to_string()
    }

    /// True for failures caused by the request's image (as opposed to the engine).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            AnalysisError::NotFound { .. } | AnalysisError::Decode { .. } | AnalysisError::EmptyImage { .. }
        )
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            AnalysisError::NotFound { path }
            | AnalysisError::Decode { path, .. }
            | AnalysisError::EmptyImage { path } => Some(path),
            AnalysisError::MissingAttribute(_) | AnalysisError::Worker(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

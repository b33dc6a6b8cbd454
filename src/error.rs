//! Error types for the gongwen library.

use std::io;
use thiserror::Error;

/// Result type alias for gongwen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while configuring or rendering a document.
///
/// Analysis (normalization, segmentation, classification, tagging) never
/// fails; only back ends, configuration loading and file I/O do.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A renderer could not serialize its target representation.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Style table or vocabulary configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Render(format!("PDF serialization failed: {}", err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl Error {
    /// Whether this is a render failure that the caller may surface as
    /// "export failed, retry".
    pub fn is_render_failure(&self) -> bool {
        matches!(self, Error::Render(_))
    }
}

//! Error types for the render pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while materializing, rendering or assembling slides
#[derive(Error, Debug)]
pub enum Error {
    /// A rendering backend cannot be located (not compiled in, or no browser binary)
    #[error("{backend} backend unavailable: {reason}")]
    MissingDependency { backend: &'static str, reason: String },

    /// A backend is present but failed to capture the page
    #[error("Rendering failed: {0}")]
    RenderFailure(String),

    /// A slide source file could not be read
    #[error("Missing source file {}: {source}", .path.display())]
    MissingSourceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to write or read the presentation package
    #[error("Package error: {0}")]
    Package(String),

    /// Malformed XML inside a presentation package
    #[error("XML error: {0}")]
    Xml(String),

    /// Failed to decode a snapshot image
    #[error("Image error: {0}")]
    Image(String),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the backend could not be used at all, as
    /// opposed to a capture that was attempted and failed.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Error::MissingDependency { .. })
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Package(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

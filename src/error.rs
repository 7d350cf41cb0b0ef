//! Centralized error types for peekdoc.
//!
//! The decode path itself is total and never returns these; they cover the
//! edges around it (reading files, the input-size guard, configuration).

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the peekdoc library.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The input exceeds the configured maximum preview size.
    #[error("Input of {size} bytes exceeds the preview limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    /// A file id that cannot be mapped to a location (e.g. contains `..`).
    #[error("Invalid file id: {0}")]
    InvalidFileId(String),

    /// Configuration could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias for `Result<T, PreviewError>`.
pub type Result<T> = std::result::Result<T, PreviewError>;

impl PreviewError {
    /// Create an `Io` variant from a path and an `io::Error`.
    ///
    /// `NotFound` is mapped to [`PreviewError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound(path);
        }
        Self::Io { path, source }
    }
}

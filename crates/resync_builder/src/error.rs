//! Error types for the inventory builder.

use resync_codec::CodecError;
use resync_core::CoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that abort a build.
///
/// Failures of individual files during a disk scan do not surface here;
/// they are recorded in the build report instead.
#[derive(Error, Debug)]
pub enum BuildError {
    /// An exclusion pattern is not a valid regular expression.
    #[error("invalid exclude pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// The scan root does not exist or is not a directory.
    #[error("source not found: {}", path.display())]
    SourceNotFound {
        /// The root that was requested.
        path: PathBuf,
    },

    /// A document could not be fetched.
    #[error("fetch failed for {uri}: {message}")]
    Fetch {
        /// URI being fetched.
        uri: String,
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Codec error, including an index where a leaf was expected.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl BuildError {
    /// Create a fetch error.
    pub fn fetch(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Returns true if the failure was an index where a leaf was expected.
    pub fn is_unexpected_index(&self) -> bool {
        matches!(self, Self::Codec(e) if e.is_unexpected_index())
    }
}

//! Error types for the codec crate.

use crate::index::SitemapIndex;
use resync_core::CoreError;
use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The document is not well-formed XML, or a required field is missing
    /// or unparsable.
    #[error("malformed document: {message}")]
    MalformedDocument {
        /// Description of the problem.
        message: String,
    },

    /// A sitemap index was found where a leaf document was expected.
    ///
    /// Carries the parsed index so the caller can fetch each child.
    #[error("got sitemapindex with {} entries when expecting sitemap", .0.len())]
    UnexpectedIndex(SitemapIndex),

    /// Single-document output was requested but there are too many entries.
    #[error("too many entries for a single sitemap: {entries} > {max}, multi-file not enabled")]
    CapacityExceeded {
        /// Number of entries in the inventory.
        entries: usize,
        /// Per-document cap.
        max: usize,
    },

    /// Failed to write XML.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// I/O error while reading or writing sitemap files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl CodecError {
    /// Create a malformed document error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Returns true if this is the index-instead-of-leaf condition.
    pub fn is_unexpected_index(&self) -> bool {
        matches!(self, Self::UnexpectedIndex(_))
    }
}

//! Error types for the resync core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The resource URI is empty, contains whitespace or control
    /// characters, or is not an absolute reference.
    #[error("invalid resource URI {uri:?}: {reason}")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A resource with this URI already exists in the repository.
    #[error("resource already exists: {uri}")]
    ResourceExists {
        /// URI of the existing resource.
        uri: String,
    },

    /// No resource with this URI exists in the repository.
    #[error("resource not found: {uri}")]
    ResourceNotFound {
        /// URI that was looked up.
        uri: String,
    },

    /// Every sequence id has been assigned.
    #[error("sequence ids exhausted after {last}")]
    SequenceExhausted {
        /// The last id that was assigned.
        last: u64,
    },
}

impl CoreError {
    /// Creates an invalid URI error.
    pub fn invalid_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Creates a resource exists error.
    pub fn resource_exists(uri: impl Into<String>) -> Self {
        Self::ResourceExists { uri: uri.into() }
    }

    /// Creates a resource not found error.
    pub fn resource_not_found(uri: impl Into<String>) -> Self {
        Self::ResourceNotFound { uri: uri.into() }
    }
}

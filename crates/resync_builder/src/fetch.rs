//! Document retrieval abstraction.

use crate::error::{BuildError, BuildResult};
use resync_core::UriMapper;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use url::Url;

/// Fetches the bytes of a sitemap document by URI.
///
/// This trait abstracts the transport, allowing for different
/// implementations (local files, HTTP, in-memory for testing, etc.).
pub trait DocumentFetcher: Send + Sync {
    /// Fetches a document.
    fn fetch(&self, uri: &str) -> BuildResult<Vec<u8>>;
}

/// Reads documents from the local filesystem.
///
/// A URI is resolved in order through the configured mappings (URI prefix
/// to local directory), as a `file://` URL, or as a plain path.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    mapper: UriMapper,
}

impl FileFetcher {
    /// Creates a fetcher with no mappings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves URIs under `uri_prefix` from `local_dir`.
    #[must_use]
    pub fn with_mapping(mut self, uri_prefix: impl AsRef<str>, local_dir: impl AsRef<str>) -> Self {
        self.mapper.insert(uri_prefix, local_dir);
        self
    }

    fn resolve(&self, uri: &str) -> BuildResult<PathBuf> {
        if let Some(local) = self.mapper.map(uri) {
            return Ok(PathBuf::from(local));
        }
        match Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|()| BuildError::fetch(uri, "not a local file URL")),
            // A single letter scheme is a Windows drive
            Ok(url) if url.scheme().len() > 1 => Err(BuildError::fetch(
                uri,
                format!("unsupported scheme {:?}", url.scheme()),
            )),
            _ => Ok(PathBuf::from(uri)),
        }
    }
}

impl DocumentFetcher for FileFetcher {
    fn fetch(&self, uri: &str) -> BuildResult<Vec<u8>> {
        let path = self.resolve(uri)?;
        debug!(uri, path = %path.display(), "reading document");
        fs::read(&path).map_err(|e| BuildError::fetch(uri, e.to_string()))
    }
}

/// Serves documents from memory, for testing.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document.
    pub fn insert(&mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.documents.insert(uri.into(), bytes.into());
    }

    /// Returns how many fetches were made.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DocumentFetcher for MemoryFetcher {
    fn fetch(&self, uri: &str) -> BuildResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(uri)
            .cloned()
            .ok_or_else(|| BuildError::fetch(uri, "not found"))
    }
}

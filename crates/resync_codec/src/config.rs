//! Sitemap output configuration.

use resync_core::UriMapper;

/// Default per-document cap, the sitemaps.org limit.
pub const DEFAULT_MAX_ENTRIES: usize = 50_000;

/// Configuration for encoding and writing sitemaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapConfig {
    /// Maximum number of entries per document.
    pub max_entries: usize,
    /// Whether an oversized inventory may be split into an index plus
    /// child documents.
    pub allow_multi_file: bool,
    /// Emit one element per line with indentation.
    pub pretty: bool,
    /// Maps child document paths to URIs for the index.
    pub mapper: UriMapper,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            allow_multi_file: false,
            pretty: false,
            mapper: UriMapper::new(),
        }
    }
}

impl SitemapConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-document cap. Zero is treated as one.
    #[must_use]
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Allows or forbids multi-file output.
    #[must_use]
    pub fn allow_multi_file(mut self, allow: bool) -> Self {
        self.allow_multi_file = allow;
        self
    }

    /// Enables or disables pretty output.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Replaces the URI mapper.
    #[must_use]
    pub fn mapper(mut self, mapper: UriMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Adds one path to URI mapping.
    #[must_use]
    pub fn with_mapping(mut self, local: impl AsRef<str>, uri: impl AsRef<str>) -> Self {
        self.mapper.insert(local, uri);
        self
    }

    pub(crate) fn cap(&self) -> usize {
        self.max_entries.max(1)
    }
}

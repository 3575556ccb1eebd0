//! Mapping between local paths and URIs.

use std::collections::BTreeMap;
use std::path::{Path, MAIN_SEPARATOR};

/// Maps local identifiers (file paths) into URI space by prefix substitution.
///
/// Mappings are tried in ascending order of their local prefix. A local
/// prefix matches only on a path-segment boundary, so `/data` maps
/// `/data/a` but not `/database/a`.
///
/// ```
/// use resync_core::UriMapper;
///
/// let mapper = UriMapper::single("/srv/files", "http://example.org/t");
/// assert_eq!(
///     mapper.map("/srv/files/dir/file_a").as_deref(),
///     Some("http://example.org/t/dir/file_a")
/// );
/// assert!(mapper.map("/elsewhere/file_a").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriMapper {
    mappings: BTreeMap<String, String>,
}

impl UriMapper {
    /// Creates a mapper with no mappings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapper with one mapping.
    pub fn single(local: impl AsRef<str>, uri: impl AsRef<str>) -> Self {
        Self::new().with_mapping(local, uri)
    }

    /// Adds a mapping from a local prefix to a URI prefix.
    #[must_use]
    pub fn with_mapping(mut self, local: impl AsRef<str>, uri: impl AsRef<str>) -> Self {
        self.insert(local, uri);
        self
    }

    /// Adds a mapping in place.
    pub fn insert(&mut self, local: impl AsRef<str>, uri: impl AsRef<str>) {
        let local = normalize(local.as_ref());
        let local = trim_trailing_slash(&local).to_string();
        let uri = trim_trailing_slash(uri.as_ref()).to_string();
        self.mappings.insert(local, uri);
    }

    /// Returns true if there are no mappings.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Iterates `(local, uri)` prefix pairs in match order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.mappings
            .iter()
            .map(|(local, uri)| (local.as_str(), uri.as_str()))
    }

    /// Maps a local identifier to a URI.
    ///
    /// Separators are normalised to `/` before matching. Returns `None` if
    /// no mapping applies.
    pub fn map(&self, local: &str) -> Option<String> {
        let local = normalize(local);
        self.mappings.iter().find_map(|(prefix, uri)| {
            let rest = local.strip_prefix(prefix.as_str())?;
            if rest.is_empty() {
                Some(uri.clone())
            } else if rest.starts_with('/') {
                Some(format!("{uri}{rest}"))
            } else if prefix.is_empty() || prefix.ends_with('/') {
                Some(format!("{uri}/{rest}"))
            } else {
                None
            }
        })
    }

    /// Maps a filesystem path to a URI.
    ///
    /// Returns `None` for paths that are not valid UTF-8 or match no mapping.
    pub fn map_path(&self, path: &Path) -> Option<String> {
        self.map(path.to_str()?)
    }
}

fn normalize(local: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        local.to_string()
    } else {
        local.replace(MAIN_SEPARATOR, "/")
    }
}

fn trim_trailing_slash(s: &str) -> &str {
    if s.len() > 1 {
        s.trim_end_matches('/')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_on_segment_boundary() {
        let mapper = UriMapper::single("/data", "http://example.org/t/");
        assert_eq!(
            mapper.map("/data/file_a").as_deref(),
            Some("http://example.org/t/file_a")
        );
        assert_eq!(mapper.map("/data").as_deref(), Some("http://example.org/t"));
        assert!(mapper.map("/database/file_a").is_none());
    }

    #[test]
    fn trailing_slash_on_local_prefix() {
        let mapper = UriMapper::single("/data/", "http://example.org/t");
        assert_eq!(
            mapper.map("/data/sub/file").as_deref(),
            Some("http://example.org/t/sub/file")
        );
    }

    #[test]
    fn first_matching_prefix_wins() {
        let mapper = UriMapper::new()
            .with_mapping("/a", "http://one.example.org")
            .with_mapping("/a/b", "http://two.example.org");

        // Prefixes are tried in ascending order
        assert_eq!(
            mapper.map("/a/b/c").as_deref(),
            Some("http://one.example.org/b/c")
        );
    }

    #[test]
    fn relative_paths() {
        let mapper = UriMapper::single("out", "http://example.org/sitemaps");
        assert_eq!(
            mapper.map("out/sitemap00001.xml").as_deref(),
            Some("http://example.org/sitemaps/sitemap00001.xml")
        );
    }

    #[test]
    fn empty_mapper_maps_nothing() {
        assert!(UriMapper::new().map("/data/file").is_none());
    }

    #[test]
    fn map_path_uses_forward_slashes() {
        let mapper = UriMapper::single("/srv", "http://example.org");
        let path = Path::new("/srv").join("dir").join("file");
        assert_eq!(
            mapper.map_path(&path).as_deref(),
            Some("http://example.org/dir/file")
        );
    }
}

//! A single addressable resource.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Description of one resource in a repository.
///
/// A resource is identified by its URI. Two resources with the same URI
/// compare equal even if their other fields differ, which is what an
/// inventory keys on. Use [`Resource::same_fields`] to compare everything.
///
/// Resources are immutable: the `with_*` setters consume the value and
/// return a new one.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lastmod: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    md5: Option<String>,
}

impl Resource {
    /// Creates a resource with only a URI.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidUri`] if `uri` is empty, contains
    /// whitespace or control characters, or is not an absolute reference
    /// (it must carry a scheme).
    pub fn new(uri: impl Into<String>) -> CoreResult<Self> {
        let uri = uri.into();
        validate_uri(&uri)?;
        Ok(Self {
            uri,
            lastmod: None,
            size: None,
            md5: None,
        })
    }

    /// Sets the last modification time.
    #[must_use]
    pub fn with_lastmod(mut self, lastmod: DateTime<Utc>) -> Self {
        self.lastmod = Some(lastmod);
        self
    }

    /// Sets the size in bytes.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the hex encoded MD5 digest of the content.
    #[must_use]
    pub fn with_md5(mut self, md5: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self
    }

    /// Returns a copy stamped with the time it was deleted.
    #[must_use]
    pub fn deleted_at(self, at: DateTime<Utc>) -> Self {
        self.with_lastmod(at)
    }

    /// Returns the URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the last modification time, if known.
    pub fn lastmod(&self) -> Option<DateTime<Utc>> {
        self.lastmod
    }

    /// Returns the size in bytes, if known.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns the MD5 digest, if known.
    pub fn md5(&self) -> Option<&str> {
        self.md5.as_deref()
    }

    /// Returns true if every field, not just the URI, matches.
    pub fn same_fields(&self, other: &Resource) -> bool {
        self.uri == other.uri
            && self.lastmod == other.lastmod
            && self.size == other.size
            && self.md5 == other.md5
    }
}

fn validate_uri(uri: &str) -> CoreResult<()> {
    if uri.is_empty() {
        return Err(CoreError::invalid_uri(uri, "empty"));
    }
    // Url::parse strips and repairs these, so the stored key would not
    // survive a round trip through a document.
    if uri.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CoreError::invalid_uri(uri, "contains whitespace or control characters"));
    }
    url::Url::parse(uri)
        .map(|_| ())
        .map_err(|e| CoreError::invalid_uri(uri, e.to_string()))
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl PartialOrd for Resource {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Resource {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uri.cmp(&other.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_resource_has_no_optional_fields() {
        let r = Resource::new("http://example.org/a").unwrap();
        assert_eq!(r.uri(), "http://example.org/a");
        assert!(r.lastmod().is_none());
        assert!(r.size().is_none());
        assert!(r.md5().is_none());
    }

    #[test]
    fn empty_uri_rejected() {
        let err = Resource::new("").unwrap_err();
        assert!(matches!(err, CoreError::InvalidUri { .. }));
    }

    #[test]
    fn relative_uri_rejected() {
        assert!(Resource::new("file_a").is_err());
        assert!(Resource::new("/t/file_a").is_err());
    }

    #[test]
    fn whitespace_and_control_characters_rejected() {
        for uri in [
            "http://example.org/a ",
            " http://example.org/a",
            "http://example.org/a b",
            "http://example.org/a\tb",
            "http://example.org/a\n",
            "http://example.org/\u{7f}",
        ] {
            let err = Resource::new(uri).unwrap_err();
            assert!(matches!(err, CoreError::InvalidUri { .. }), "{uri:?}");
        }
    }

    #[test]
    fn equality_is_by_uri() {
        let a = Resource::new("http://example.org/a").unwrap().with_size(1);
        let b = Resource::new("http://example.org/a").unwrap().with_size(2);
        assert_eq!(a, b);
        assert!(!a.same_fields(&b));
    }

    #[test]
    fn deleted_at_stamps_lastmod() {
        let t0 = Utc.with_ymd_and_hms(2012, 3, 14, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2012, 3, 15, 0, 0, 0).unwrap();
        let r = Resource::new("http://example.org/a")
            .unwrap()
            .with_lastmod(t0)
            .with_size(10);
        let deleted = r.clone().deleted_at(t1);
        assert_eq!(deleted.lastmod(), Some(t1));
        assert_eq!(deleted.size(), Some(10));
        assert_eq!(r.lastmod(), Some(t0));
    }
}

//! Sitemap index model.

use chrono::{DateTime, Utc};

/// One child reference in a sitemap index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// URI of the child document.
    pub loc: String,
    /// Time the child document was produced.
    pub lastmod: DateTime<Utc>,
}

/// A parsed or generated `sitemapindex` document.
///
/// Entries keep document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapIndex {
    entries: Vec<IndexEntry>,
}

impl SitemapIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a child reference.
    pub fn push(&mut self, loc: impl Into<String>, lastmod: DateTime<Utc>) {
        self.entries.push(IndexEntry {
            loc: loc.into(),
            lastmod,
        });
    }

    /// Returns the child references.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Iterates child URIs in document order.
    pub fn locs(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.loc.as_str())
    }

    /// Returns the number of children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index lists no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<IndexEntry> for SitemapIndex {
    fn from_iter<I: IntoIterator<Item = IndexEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SitemapIndex {
    type Item = &'a IndexEntry;
    type IntoIter = std::slice::Iter<'a, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

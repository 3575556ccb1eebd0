//! Change feed configuration.

use crate::change_memory::ChangeWindow;
use crate::types::SequenceId;

/// Where a source publishes its change feed.
///
/// The full feed lives at `{base_url}{path}`; the window starting at a
/// sequence id lives at `{base_url}{path}/{id}/diff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFeedConfig {
    /// Scheme and authority of the source, e.g. `http://localhost:8888`.
    pub base_url: String,
    /// Path of the change feed below `base_url`.
    pub path: String,
}

impl Default for ChangeFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            path: "/changes".to_string(),
        }
    }
}

impl ChangeFeedConfig {
    /// Creates a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the change feed path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Returns the URI of the full change feed.
    pub fn feed_uri(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }

    /// Returns the URI of the window starting at `id`.
    pub fn diff_uri(&self, id: SequenceId) -> String {
        format!("{}/{}/diff", self.feed_uri(), id)
    }

    /// Returns the "this" and "next" links for a window.
    ///
    /// "this" points at the first event of the window (or the requested
    /// start if it is empty). "next" points just past the last event, so a
    /// consumer following it never receives an event twice.
    pub fn links(&self, window: &ChangeWindow) -> FeedLinks {
        let this = window
            .iter()
            .next()
            .map(|e| e.sequence())
            .unwrap_or(window.start());
        let next = window.last_id().map(SequenceId::next).unwrap_or(this);
        FeedLinks {
            this: self.diff_uri(this),
            next: self.diff_uri(next),
        }
    }
}

/// Navigation links of a change feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLinks {
    /// URI of the window being served.
    pub this: String,
    /// URI to poll for changes after this window.
    pub next: String,
}

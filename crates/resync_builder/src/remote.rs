//! Building inventories from sitemap documents.

use crate::builder::{BuildReport, InventoryBuilder};
use crate::error::{BuildError, BuildResult};
use crate::fetch::DocumentFetcher;
use resync_codec::{decode_into, parse_document, CodecError, SitemapDocument};
use resync_core::Inventory;
use tracing::{debug, info};

impl InventoryBuilder {
    /// Fetches and decodes a document, leaving index handling to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Fetch`] if the document cannot be retrieved and
    /// [`BuildError::Codec`] if it does not decode.
    pub fn from_remote(
        &self,
        fetcher: &dyn DocumentFetcher,
        uri: &str,
    ) -> BuildResult<SitemapDocument> {
        let bytes = fetcher.fetch(uri)?;
        Ok(parse_document(&bytes)?)
    }

    /// Fetches a leaf document and adds its resources to `inventory`.
    ///
    /// Returns the number of entries read.
    ///
    /// # Errors
    ///
    /// An index yields `BuildError::Codec(CodecError::UnexpectedIndex(..))`
    /// and leaves `inventory` unchanged.
    pub fn from_remote_into(
        &self,
        fetcher: &dyn DocumentFetcher,
        uri: &str,
        inventory: &mut Inventory,
    ) -> BuildResult<usize> {
        let bytes = fetcher.fetch(uri)?;
        let added = decode_into(&bytes, inventory)?;
        debug!(uri, added, "read sitemap");
        Ok(added)
    }

    /// Fetches a document and, if it is an index, every child it lists.
    ///
    /// Children are merged in index order. Nested indexes are rejected.
    /// Cancellation is checked before each child.
    pub fn collect_remote(
        &self,
        fetcher: &dyn DocumentFetcher,
        uri: &str,
    ) -> BuildResult<BuildReport> {
        let mut report = BuildReport::default();
        match self.from_remote(fetcher, uri)? {
            SitemapDocument::Urlset(inventory) => {
                report.added = inventory.len();
                report.inventory = inventory;
            }
            SitemapDocument::Index(index) => {
                info!(uri, children = index.len(), "following sitemapindex");
                for child in index.locs() {
                    if self.is_cancelled() {
                        info!(added = report.added, "remote collection cancelled");
                        report.cancelled = true;
                        break;
                    }
                    report.added += self
                        .from_remote_into(fetcher, child, &mut report.inventory)
                        .map_err(|e| nested(child, e))?;
                }
            }
        }
        Ok(report)
    }
}

fn nested(child: &str, err: BuildError) -> BuildError {
    match err {
        BuildError::Codec(CodecError::UnexpectedIndex(_)) => {
            BuildError::Codec(CodecError::malformed(format!(
                "{child} is a nested sitemapindex"
            )))
        }
        other => other,
    }
}

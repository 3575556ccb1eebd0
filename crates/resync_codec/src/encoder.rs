//! Inventory and sitemap index encoder.

use crate::config::SitemapConfig;
use crate::datetime::format_datetime;
use crate::error::{CodecError, CodecResult};
use crate::index::SitemapIndex;
use crate::xml::DocumentWriter;
use crate::{RS_NS, SITEMAP_NS};
use chrono::{DateTime, Utc};
use resync_core::{Inventory, Resource};
use tracing::{debug, warn};

/// Output of [`encode_inventory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedInventory {
    /// The inventory fit in one document.
    Single(Vec<u8>),
    /// The inventory was split into child documents plus an index.
    Multi {
        /// The `sitemapindex` document.
        index: Vec<u8>,
        /// Child documents in index order.
        children: Vec<ChildDocument>,
        /// Child names that no mapping applied to. Their raw name was used
        /// as `loc` in the index.
        unmapped: Vec<String>,
    },
}

impl EncodedInventory {
    /// Returns true if the output is an index plus children.
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi { .. })
    }
}

/// One child document of a split inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDocument {
    /// Local name, `<stem>NNNNN.xml` next to the base name.
    pub name: String,
    /// URI listed in the index.
    pub uri: String,
    /// Encoded `urlset` document.
    pub bytes: Vec<u8>,
    /// Encode timestamp, listed in the index.
    pub lastmod: DateTime<Utc>,
    /// Number of resources in this child.
    pub entries: usize,
}

/// Encodes an inventory, splitting it if it exceeds the configured cap.
///
/// `basename` names the single document or the index. Child documents are
/// named by inserting a five-digit counter before the `.xml` suffix
/// (`sitemap.xml` gives `sitemap00000.xml`, `sitemap00001.xml`, ...) and
/// mapped to URIs through `config.mapper`.
///
/// # Errors
///
/// Returns [`CodecError::CapacityExceeded`] if the inventory is too large
/// and multi-file output is not allowed.
pub fn encode_inventory(
    inventory: &Inventory,
    config: &SitemapConfig,
    basename: &str,
) -> CodecResult<EncodedInventory> {
    encode_inventory_at(inventory, config, basename, Utc::now())
}

/// Like [`encode_inventory`] with an explicit encode timestamp.
pub fn encode_inventory_at(
    inventory: &Inventory,
    config: &SitemapConfig,
    basename: &str,
    now: DateTime<Utc>,
) -> CodecResult<EncodedInventory> {
    let cap = config.cap();
    if inventory.len() <= cap {
        debug!(entries = inventory.len(), "encoding single sitemap");
        return encode_urlset(inventory.iter(), config.pretty).map(EncodedInventory::Single);
    }
    if !config.allow_multi_file {
        return Err(CodecError::CapacityExceeded {
            entries: inventory.len(),
            max: cap,
        });
    }

    let mut index = SitemapIndex::new();
    let mut children = Vec::new();
    let mut unmapped = Vec::new();
    for (n, chunk) in inventory.chunks(cap).into_iter().enumerate() {
        let name = child_name(basename, n);
        let uri = match config.mapper.map(&name) {
            Some(uri) => uri,
            None => {
                warn!(child = %name, "cannot map sitemap to URI space, using local name");
                unmapped.push(name.clone());
                name.clone()
            }
        };
        let entries = chunk.len();
        let bytes = encode_urlset(chunk, config.pretty)?;
        index.push(uri.clone(), now);
        children.push(ChildDocument {
            name,
            uri,
            bytes,
            lastmod: now,
            entries,
        });
    }
    debug!(children = children.len(), "encoded multi-file sitemap");

    Ok(EncodedInventory::Multi {
        index: encode_index(&index, config.pretty)?,
        children,
        unmapped,
    })
}

/// Encodes resources as a `urlset` document in the order given.
///
/// Pass an [`Inventory`] iterator to get ascending URI order.
pub fn encode_urlset<'a, I>(resources: I, pretty: bool) -> CodecResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a Resource>,
{
    let mut doc = DocumentWriter::new(pretty)?;
    doc.start("urlset", &[("xmlns", SITEMAP_NS), ("xmlns:rs", RS_NS)])?;
    for resource in resources {
        write_url(&mut doc, resource, |_| Ok(()))?;
    }
    doc.end("urlset")?;
    Ok(doc.finish())
}

/// Encodes a `sitemapindex` document.
pub fn encode_index(index: &SitemapIndex, pretty: bool) -> CodecResult<Vec<u8>> {
    let mut doc = DocumentWriter::new(pretty)?;
    doc.start("sitemapindex", &[("xmlns", SITEMAP_NS)])?;
    for entry in index {
        doc.start("sitemap", &[])?;
        doc.text_element("loc", &entry.loc)?;
        doc.text_element("lastmod", &format_datetime(entry.lastmod))?;
        doc.end("sitemap")?;
    }
    doc.end("sitemapindex")?;
    Ok(doc.finish())
}

/// Writes one `<url>` record. `extra` appends elements after the resource
/// fields.
pub(crate) fn write_url<F>(
    doc: &mut DocumentWriter,
    resource: &Resource,
    extra: F,
) -> CodecResult<()>
where
    F: FnOnce(&mut DocumentWriter) -> CodecResult<()>,
{
    doc.start("url", &[])?;
    doc.text_element("loc", resource.uri())?;
    if let Some(lastmod) = resource.lastmod() {
        doc.text_element("lastmod", &format_datetime(lastmod))?;
    }
    if let Some(size) = resource.size() {
        doc.text_element("rs:size", &size.to_string())?;
    }
    if let Some(md5) = resource.md5() {
        doc.text_element("rs:md5", md5)?;
    }
    extra(doc)?;
    doc.end("url")
}

/// Name of the `n`th child document of `basename`.
pub fn child_name(basename: &str, n: usize) -> String {
    let stem = basename.strip_suffix(".xml").unwrap_or(basename);
    format!("{stem}{n:05}.xml")
}

//! Reading and writing sitemap files.

use crate::config::SitemapConfig;
use crate::decoder::{parse_document, SitemapDocument};
use crate::encoder::{encode_inventory, EncodedInventory};
use crate::error::CodecResult;
use resync_core::Inventory;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// What [`write_sitemap`] put on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Files written, children first, then the single sitemap or index.
    pub files: Vec<PathBuf>,
    /// Whether `basename` holds an index.
    pub is_index: bool,
    /// Child files that could not be mapped to URIs.
    pub unmapped: Vec<String>,
}

/// Writes an inventory as one sitemap, or as child sitemaps plus an index.
///
/// `basename` receives the single sitemap or the index. Children are
/// written next to it as `<stem>NNNNN.xml`. Encoding happens before any
/// file is created, so a capacity error writes nothing.
pub fn write_sitemap(
    inventory: &Inventory,
    basename: &Path,
    config: &SitemapConfig,
) -> CodecResult<WriteSummary> {
    let name = basename.to_string_lossy();
    match encode_inventory(inventory, config, &name)? {
        EncodedInventory::Single(bytes) => {
            fs::write(basename, bytes)?;
            info!(path = %basename.display(), entries = inventory.len(), "wrote sitemap");
            Ok(WriteSummary {
                files: vec![basename.to_path_buf()],
                is_index: false,
                unmapped: Vec::new(),
            })
        }
        EncodedInventory::Multi {
            index,
            children,
            unmapped,
        } => {
            let mut files = Vec::with_capacity(children.len() + 1);
            for child in children {
                let path = PathBuf::from(&child.name);
                fs::write(&path, &child.bytes)?;
                files.push(path);
            }
            info!(count = files.len(), "wrote sitemaps");
            fs::write(basename, index)?;
            info!(path = %basename.display(), "wrote sitemapindex");
            files.push(basename.to_path_buf());
            Ok(WriteSummary {
                files,
                is_index: true,
                unmapped,
            })
        }
    }
}

/// Reads and decodes a sitemap or sitemap index file.
pub fn read_sitemap(path: &Path) -> CodecResult<SitemapDocument> {
    let bytes = fs::read(path)?;
    parse_document(&bytes)
}

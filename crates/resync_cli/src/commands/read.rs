//! Read command implementation.

use super::parse_mapping;
use resync_builder::{BuilderConfig, FileFetcher, InventoryBuilder};
use resync_codec::SitemapDocument;
use resync_core::{Inventory, Resource};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ReadResult<'a> {
    Urlset { resources: Vec<&'a Resource> },
    Index { sitemaps: Vec<IndexItem> },
}

#[derive(Debug, Serialize)]
struct IndexItem {
    loc: String,
    lastmod: String,
}

/// Runs the read command.
pub fn run(
    source: &str,
    follow_index: bool,
    map: &[String],
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut fetcher = FileFetcher::new();
    for arg in map {
        let (uri, local) = parse_mapping(arg)?;
        fetcher = fetcher.with_mapping(uri, local);
    }
    let builder = InventoryBuilder::new(BuilderConfig::default())?;

    let inventory: Inventory;
    let result = if follow_index {
        inventory = builder.collect_remote(&fetcher, source)?.inventory;
        ReadResult::Urlset {
            resources: inventory.iter().collect(),
        }
    } else {
        match builder.from_remote(&fetcher, source)? {
            SitemapDocument::Urlset(leaf) => {
                inventory = leaf;
                ReadResult::Urlset {
                    resources: inventory.iter().collect(),
                }
            }
            SitemapDocument::Index(index) => ReadResult::Index {
                sitemaps: index
                    .entries()
                    .iter()
                    .map(|entry| IndexItem {
                        loc: entry.loc.clone(),
                        lastmod: resync_codec::format_datetime(entry.lastmod),
                    })
                    .collect(),
            },
        }
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &ReadResult<'_>) {
    match result {
        ReadResult::Urlset { resources } => {
            println!("Sitemap with {} resources", resources.len());
            for resource in resources {
                let mut line = resource.uri().to_string();
                if let Some(lastmod) = resource.lastmod() {
                    line.push_str(&format!(" lastmod={}", resync_codec::format_datetime(lastmod)));
                }
                if let Some(size) = resource.size() {
                    line.push_str(&format!(" size={size}"));
                }
                if let Some(md5) = resource.md5() {
                    line.push_str(&format!(" md5={md5}"));
                }
                println!("  {line}");
            }
        }
        ReadResult::Index { sitemaps } => {
            println!(
                "Sitemapindex with {} sitemaps (use --follow-index to read them)",
                sitemaps.len()
            );
            for item in sitemaps {
                println!("  {} lastmod={}", item.loc, item.lastmod);
            }
        }
    }
}

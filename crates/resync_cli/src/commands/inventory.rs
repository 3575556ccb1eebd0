//! Inventory command implementation.

use super::parse_mapping;
use resync_builder::{BuilderConfig, InventoryBuilder};
use resync_codec::{fs::write_sitemap, SitemapConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options of the inventory command.
#[derive(Debug, Clone)]
pub struct InventoryOptions {
    /// Compute MD5 digests.
    pub md5: bool,
    /// Record file sizes.
    pub size: bool,
    /// Maximum entries per sitemap.
    pub max_entries: usize,
    /// Allow an index plus child sitemaps.
    pub multi_file: bool,
    /// Pretty output.
    pub pretty: bool,
    /// Extra file name patterns to exclude.
    pub exclude: Vec<String>,
    /// Extra directory names to exclude.
    pub exclude_dir: Vec<String>,
    /// `LOCAL=URI` mappings for child sitemaps.
    pub map: Vec<String>,
}

/// Inventory command result.
#[derive(Debug, Serialize)]
pub struct InventoryResult {
    /// Scanned directory.
    pub dir: String,
    /// Number of resources written.
    pub resources: usize,
    /// Files written.
    pub files: Vec<PathBuf>,
    /// Whether the output is a sitemap index.
    pub index: bool,
    /// Files skipped during the scan.
    pub skipped: Vec<String>,
    /// Child sitemaps without a URI mapping.
    pub unmapped: Vec<String>,
}

/// Runs the inventory command.
pub fn run(
    dir: &Path,
    url_prefix: &str,
    output: &Path,
    options: &InventoryOptions,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder_config = BuilderConfig::new()
        .do_md5(options.md5)
        .do_size(options.size);
    for pattern in &options.exclude {
        builder_config = builder_config.exclude_file(pattern.clone());
    }
    for name in &options.exclude_dir {
        builder_config = builder_config.exclude_dir(name.clone());
    }

    let mut sitemap_config = SitemapConfig::new()
        .max_entries(options.max_entries)
        .allow_multi_file(options.multi_file)
        .pretty(options.pretty);
    for arg in &options.map {
        let (local, uri) = parse_mapping(arg)?;
        sitemap_config = sitemap_config.with_mapping(local, uri);
    }

    debug!(dir = %dir.display(), url_prefix, "scanning directory");
    let builder = InventoryBuilder::new(builder_config)?;
    let report = builder.from_disk(dir, url_prefix)?;
    let summary = write_sitemap(&report.inventory, output, &sitemap_config)?;

    let result = InventoryResult {
        dir: dir.display().to_string(),
        resources: report.inventory.len(),
        files: summary.files,
        index: summary.is_index,
        skipped: report
            .skipped
            .iter()
            .map(|item| format!("{}: {}", item.path.display(), item.reason))
            .collect(),
        unmapped: summary.unmapped,
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &InventoryResult) {
    println!("Directory: {}", result.dir);
    println!("Resources: {}", result.resources);
    if result.index {
        println!("Wrote sitemapindex with {} sitemaps:", result.files.len() - 1);
    } else {
        println!("Wrote sitemap:");
    }
    for file in &result.files {
        println!("  {}", file.display());
    }
    if !result.skipped.is_empty() {
        println!("Skipped {} files:", result.skipped.len());
        for item in &result.skipped {
            println!("  {item}");
        }
    }
    if !result.unmapped.is_empty() {
        println!("Warning: {} sitemaps could not be mapped to URIs", result.unmapped.len());
    }
}

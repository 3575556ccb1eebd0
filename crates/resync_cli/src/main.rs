//! Resync CLI
//!
//! Command-line tools for ResourceSync inventories.
//!
//! # Commands
//!
//! - `inventory` - Scan a directory and write a sitemap (or sitemap index)
//! - `read` - Read a sitemap and list its resources
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ResourceSync inventory tools.
#[derive(Parser)]
#[command(name = "resync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and write its inventory as a sitemap
    Inventory {
        /// Directory to scan
        dir: PathBuf,

        /// URI prefix that replaces the directory path
        #[arg(short, long)]
        url_prefix: String,

        /// Sitemap file, or the index when the inventory is split
        #[arg(short, long, default_value = "sitemap.xml")]
        output: PathBuf,

        /// Compute MD5 digests
        #[arg(long)]
        md5: bool,

        /// Do not record file sizes
        #[arg(long)]
        no_size: bool,

        /// Maximum entries per sitemap
        #[arg(long, default_value_t = resync_codec::DEFAULT_MAX_ENTRIES)]
        max_entries: usize,

        /// Allow splitting into several sitemaps plus an index
        #[arg(long)]
        multi_file: bool,

        /// Write one element per line
        #[arg(long)]
        pretty: bool,

        /// Additional file name pattern to exclude
        #[arg(long = "exclude", value_name = "RE")]
        exclude: Vec<String>,

        /// Additional directory name to exclude
        #[arg(long = "exclude-dir", value_name = "NAME")]
        exclude_dir: Vec<String>,

        /// Map a local path prefix to a URI prefix for the index
        #[arg(long = "map", value_name = "LOCAL=URI")]
        map: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Read a sitemap and list its resources
    Read {
        /// Sitemap file path or URI
        source: String,

        /// Fetch and merge every child of a sitemap index
        #[arg(long)]
        follow_index: bool,

        /// Serve a URI prefix from a local directory
        #[arg(long = "map", value_name = "URI=LOCAL")]
        map: Vec<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inventory {
            dir,
            url_prefix,
            output,
            md5,
            no_size,
            max_entries,
            multi_file,
            pretty,
            exclude,
            exclude_dir,
            map,
            format,
        } => {
            let options = commands::inventory::InventoryOptions {
                md5,
                size: !no_size,
                max_entries,
                multi_file,
                pretty,
                exclude,
                exclude_dir,
                map,
            };
            commands::inventory::run(&dir, &url_prefix, &output, &options, &format)?;
        }
        Commands::Read {
            source,
            follow_index,
            map,
            format,
        } => {
            commands::read::run(&source, follow_index, &map, &format)?;
        }
        Commands::Version => {
            println!("Resync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Resync Core v{}", resync_core::VERSION);
        }
    }

    Ok(())
}

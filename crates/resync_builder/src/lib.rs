//! # Resync Builder
//!
//! Builds ResourceSync inventories from external sources.
//!
//! - [`InventoryBuilder::from_disk`] walks a directory tree, applies the
//!   exclusion policy and maps each file to a URI under a prefix
//! - [`InventoryBuilder::from_remote`] and
//!   [`InventoryBuilder::collect_remote`] read sitemap documents through a
//!   [`DocumentFetcher`]
//!
//! Files that fail individually are skipped and listed in the
//! [`BuildReport`]; the build itself carries on.
//!
//! ## Usage
//!
//! ```no_run
//! use resync_builder::{BuilderConfig, InventoryBuilder};
//! use std::path::Path;
//!
//! let builder = InventoryBuilder::new(BuilderConfig::new().do_md5(true))?;
//! let report = builder.from_disk(Path::new("/srv/files"), "http://example.org/files")?;
//! println!("{} resources, {} skipped", report.added, report.skipped.len());
//! # Ok::<(), resync_builder::BuildError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod digest;
mod error;
mod fetch;
mod policy;
mod remote;

pub use builder::{BuildReport, InventoryBuilder, SkippedItem};
pub use config::BuilderConfig;
pub use digest::{md5_bytes, md5_file};
pub use error::{BuildError, BuildResult};
pub use fetch::{DocumentFetcher, FileFetcher, MemoryFetcher};
pub use policy::{ExclusionPolicy, ExtractionPolicy, FieldExtractor};

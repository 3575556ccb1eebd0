//! Inventory builder and disk scan.

use crate::config::BuilderConfig;
use crate::error::{BuildError, BuildResult};
use crate::policy::{ExclusionPolicy, ExtractionPolicy};
use resync_core::{Inventory, UriMapper};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// A file that was skipped because reading it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Path of the file or directory.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// The built (or extended) inventory.
    pub inventory: Inventory,
    /// Number of resources added by this build.
    pub added: usize,
    /// Items that failed individually.
    pub skipped: Vec<SkippedItem>,
    /// The build stopped early because it was cancelled. The inventory
    /// holds everything added before that point.
    pub cancelled: bool,
}

impl BuildReport {
    fn starting_from(inventory: Inventory) -> Self {
        Self {
            inventory,
            ..Self::default()
        }
    }

    fn skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(path = %path.display(), %reason, "ignoring file");
        self.skipped.push(SkippedItem {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Builds inventories from a directory tree or from sitemap documents.
#[derive(Debug, Clone)]
pub struct InventoryBuilder {
    config: BuilderConfig,
    exclusions: ExclusionPolicy,
    extraction: ExtractionPolicy,
    cancel: Option<Arc<AtomicBool>>,
}

impl InventoryBuilder {
    /// Creates a builder.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidPattern`] if an exclusion pattern does
    /// not compile.
    pub fn new(config: BuilderConfig) -> BuildResult<Self> {
        Ok(Self {
            exclusions: ExclusionPolicy::from_config(&config)?,
            extraction: ExtractionPolicy::from_config(&config),
            config,
            cancel: None,
        })
    }

    /// Replaces the field extraction policy.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionPolicy) -> Self {
        self.extraction = extraction;
        self
    }

    /// Observes `flag` before each item; once set, the build stops.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Scans `root` and builds a fresh inventory.
    ///
    /// Each file maps to `url_prefix` followed by its path relative to
    /// `root`, with `/` separators.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::SourceNotFound`] if `root` is not a directory.
    /// Failures of individual files are recorded in the report.
    pub fn from_disk(&self, root: &Path, url_prefix: &str) -> BuildResult<BuildReport> {
        self.from_disk_into(root, url_prefix, Inventory::new())
    }

    /// Scans `root` and adds its files to `inventory`.
    pub fn from_disk_into(
        &self,
        root: &Path,
        url_prefix: &str,
        inventory: Inventory,
    ) -> BuildResult<BuildReport> {
        if !root.is_dir() {
            return Err(BuildError::SourceNotFound {
                path: root.to_path_buf(),
            });
        }
        let mapper = UriMapper::single(root.to_string_lossy(), url_prefix);
        let mut report = BuildReport::starting_from(inventory);

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.prunes(entry));

        for entry in walker {
            if self.is_cancelled() {
                info!(added = report.added, "disk scan cancelled");
                report.cancelled = true;
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    report.skip(&path, err.to_string());
                    continue;
                }
            };
            self.visit(&entry, &mapper, &mut report);
        }

        debug!(
            root = %root.display(),
            added = report.added,
            skipped = report.skipped.len(),
            "disk scan finished"
        );
        Ok(report)
    }

    /// Returns true for an excluded directory below the root.
    fn prunes(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.exclusions.excludes_dir(name))
    }

    fn visit(&self, entry: &DirEntry, mapper: &UriMapper, report: &mut BuildReport) {
        let file_type = entry.file_type();
        if file_type.is_dir() {
            return;
        }
        let path = entry.path();
        if let Some(name) = entry.file_name().to_str() {
            if self.exclusions.excludes_file(name) {
                debug!(path = %path.display(), "excluded");
                return;
            }
        }
        if file_type.is_symlink() && !self.config.include_symlinks {
            debug!(path = %path.display(), "skipping symlink");
            return;
        }

        // Follows symlinks, so a link to a directory is not a file
        let meta = match fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return,
            Err(err) => {
                report.skip(path, err.to_string());
                return;
            }
        };
        let Some(uri) = mapper.map_path(path) else {
            report.skip(path, "path is not valid UTF-8");
            return;
        };
        match self.extraction.extract(&uri, path, &meta) {
            Ok(resource) => {
                report.inventory.add(resource);
                report.added += 1;
            }
            Err(err) => report.skip(path, err.to_string()),
        }
    }
}

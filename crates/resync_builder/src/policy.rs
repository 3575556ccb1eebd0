//! Exclusion and field extraction policies for disk scans.

use crate::config::BuilderConfig;
use crate::digest::md5_file;
use crate::error::{BuildError, BuildResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use resync_core::Resource;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Decides which files and directories a scan skips.
///
/// File patterns are matched against the file name only, anchored at its
/// start. Directory names are compared exactly and prune the whole subtree.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    files: Vec<Regex>,
    dirs: Vec<String>,
}

impl ExclusionPolicy {
    /// Compiles the exclusion lists of a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidPattern`] for a pattern that does not
    /// compile.
    pub fn from_config(config: &BuilderConfig) -> BuildResult<Self> {
        let files = config
            .exclude_files
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})")).map_err(|e| BuildError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<BuildResult<Vec<_>>>()?;
        Ok(Self {
            files,
            dirs: config.exclude_dirs.clone(),
        })
    }

    /// Returns true if a file with this name is skipped.
    pub fn excludes_file(&self, name: &str) -> bool {
        self.files.iter().any(|re| re.is_match(name))
    }

    /// Returns true if a directory with this name is pruned.
    pub fn excludes_dir(&self, name: &str) -> bool {
        self.dirs.iter().any(|d| d == name)
    }
}

/// Extracts one optional field of a resource from a file.
pub type FieldExtractor<T> = Arc<dyn Fn(&Path, &Metadata) -> io::Result<Option<T>> + Send + Sync>;

/// One extractor per optional resource field.
///
/// The defaults read `lastmod` from the modification time, `size` from the
/// file length and `md5` from the file content, gated by the configuration.
/// Any extractor can be replaced.
#[derive(Clone)]
pub struct ExtractionPolicy {
    lastmod: FieldExtractor<DateTime<Utc>>,
    size: FieldExtractor<u64>,
    md5: FieldExtractor<String>,
}

impl ExtractionPolicy {
    /// Builds the default extractors for a configuration.
    pub fn from_config(config: &BuilderConfig) -> Self {
        let size: FieldExtractor<u64> = if config.do_size {
            Arc::new(file_size)
        } else {
            Arc::new(skip::<u64>)
        };
        let md5: FieldExtractor<String> = if config.do_md5 {
            Arc::new(file_md5)
        } else {
            Arc::new(skip::<String>)
        };
        Self {
            lastmod: Arc::new(file_mtime),
            size,
            md5,
        }
    }

    /// Replaces the `lastmod` extractor.
    #[must_use]
    pub fn with_lastmod<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path, &Metadata) -> io::Result<Option<DateTime<Utc>>> + Send + Sync + 'static,
    {
        self.lastmod = Arc::new(f);
        self
    }

    /// Replaces the `size` extractor.
    #[must_use]
    pub fn with_size<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path, &Metadata) -> io::Result<Option<u64>> + Send + Sync + 'static,
    {
        self.size = Arc::new(f);
        self
    }

    /// Replaces the `md5` extractor.
    #[must_use]
    pub fn with_md5<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path, &Metadata) -> io::Result<Option<String>> + Send + Sync + 'static,
    {
        self.md5 = Arc::new(f);
        self
    }

    /// Builds the resource for `uri` from a file.
    pub fn extract(&self, uri: &str, path: &Path, meta: &Metadata) -> BuildResult<Resource> {
        let mut resource = Resource::new(uri)?;
        if let Some(lastmod) = (self.lastmod)(path, meta)? {
            resource = resource.with_lastmod(lastmod);
        }
        if let Some(size) = (self.size)(path, meta)? {
            resource = resource.with_size(size);
        }
        if let Some(md5) = (self.md5)(path, meta)? {
            resource = resource.with_md5(md5);
        }
        Ok(resource)
    }
}

fn skip<T>(_: &Path, _: &Metadata) -> io::Result<Option<T>> {
    Ok(None)
}

fn file_mtime(_: &Path, meta: &Metadata) -> io::Result<Option<DateTime<Utc>>> {
    Ok(Some(DateTime::<Utc>::from(meta.modified()?)))
}

fn file_size(_: &Path, meta: &Metadata) -> io::Result<Option<u64>> {
    Ok(Some(meta.len()))
}

fn file_md5(path: &Path, _: &Metadata) -> io::Result<Option<String>> {
    md5_file(path).map(Some)
}

impl std::fmt::Debug for ExtractionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionPolicy").finish_non_exhaustive()
    }
}

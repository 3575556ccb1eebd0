//! Configuration for the inventory builder.

/// Configuration for disk scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Compute an MD5 digest of each file. Reads every file in full.
    pub do_md5: bool,
    /// Record file sizes.
    pub do_size: bool,
    /// File name patterns to skip. Each is a regular expression matched
    /// at the start of the file name.
    pub exclude_files: Vec<String>,
    /// Directory names to prune from the traversal.
    pub exclude_dirs: Vec<String>,
    /// Include files reached through symbolic links.
    pub include_symlinks: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            do_md5: false,
            do_size: true,
            exclude_files: vec![r"sitemap\d{0,5}.xml".to_string()],
            exclude_dirs: vec!["CVS".to_string(), ".git".to_string()],
            include_symlinks: false,
        }
    }
}

impl BuilderConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables MD5 digests.
    #[must_use]
    pub fn do_md5(mut self, enabled: bool) -> Self {
        self.do_md5 = enabled;
        self
    }

    /// Enables or disables file sizes.
    #[must_use]
    pub fn do_size(mut self, enabled: bool) -> Self {
        self.do_size = enabled;
        self
    }

    /// Adds a file name pattern to skip.
    #[must_use]
    pub fn exclude_file(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_files.push(pattern.into());
        self
    }

    /// Adds a directory name to prune.
    #[must_use]
    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.exclude_dirs.push(name.into());
        self
    }

    /// Includes or skips symlinked files.
    #[must_use]
    pub fn include_symlinks(mut self, include: bool) -> Self {
        self.include_symlinks = include;
        self
    }
}

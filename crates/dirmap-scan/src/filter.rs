//! Entry filtering by name.

use globset::GlobSet;

use dirmap_core::{ScanConfig, ScanError};

/// Decides which entries a scan skips: hidden names when excluded, and
/// names matching an ignore pattern.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    ignore: GlobSet,
    include_hidden: bool,
}

impl EntryFilter {
    /// Compile the filter from scan configuration.
    pub fn from_config(config: &ScanConfig) -> Result<Self, ScanError> {
        Ok(Self {
            ignore: config.ignore_set()?,
            include_hidden: config.include_hidden,
        })
    }

    /// Check a single entry name.
    pub fn allows(&self, name: &str) -> bool {
        if !self.include_hidden && name.starts_with('.') {
            return false;
        }
        !self.ignore.is_match(name)
    }

    /// Check every segment of a slash-separated relative path.
    pub fn allows_path(&self, relative_path: &str) -> bool {
        relative_path
            .split('/')
            .filter(|s| !s.is_empty())
            .all(|segment| self.allows(segment))
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            ignore: GlobSet::empty(),
            include_hidden: true,
        }
    }
}

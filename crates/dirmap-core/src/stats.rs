//! Running scan statistics and the finalized summary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::group::DuplicateGroup;

/// Summary statistics for a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    /// Total size of all files in bytes.
    pub total_size: u64,
    /// Total number of files.
    pub total_files: u64,
    /// Total number of directories.
    pub total_dirs: u64,
    /// Member count summed over surviving duplicate groups.
    pub duplicate_files: u64,
    /// Distinct extensions seen.
    pub file_types: BTreeSet<String>,
    /// Mean directory depth (root = 0).
    pub avg_depth: f64,
    /// Deepest directory seen.
    pub max_depth: u32,
}

/// Incremental totals updated while traversing.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    total_size: u64,
    total_files: u64,
    total_dirs: u64,
    depth_sum: u64,
    max_depth: u32,
    file_types: BTreeSet<String>,
}

impl StatsAccumulator {
    /// Create new empty totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file entry.
    pub fn record_file(&mut self, size: u64, extension: &str) {
        self.total_files += 1;
        self.total_size += size;
        if !self.file_types.contains(extension) {
            self.file_types.insert(extension.to_string());
        }
    }

    /// Record a directory at the given depth.
    pub fn record_dir(&mut self, depth: u32) {
        self.total_dirs += 1;
        self.depth_sum += u64::from(depth);
        self.max_depth = self.max_depth.max(depth);
    }

    /// Freeze into a summary. `duplicates` must already be finalized.
    pub fn finalize(self, duplicates: &[DuplicateGroup]) -> FileStats {
        let avg_depth = self.depth_sum as f64 / self.total_dirs.max(1) as f64;
        let duplicate_files = duplicates.iter().map(|g| g.count() as u64).sum();

        FileStats {
            total_size: self.total_size,
            total_files: self.total_files,
            total_dirs: self.total_dirs,
            duplicate_files,
            file_types: self.file_types,
            avg_depth,
            max_depth: self.max_depth,
        }
    }
}

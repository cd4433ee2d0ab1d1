//! Duplicate group record.

use serde::{Deserialize, Serialize};

use crate::node::Fingerprint;

/// Files sharing one fingerprint.
///
/// `paths` and `full_filenames` are parallel lists in discovery order, kept
/// apart so callers can show "same content, different name" cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Fingerprint shared by all members.
    pub hash: Fingerprint,

    /// Name of the first-seen member.
    pub file_name: String,

    /// Size of each member in bytes.
    pub size: u64,

    /// Full paths of all members.
    pub paths: Vec<String>,

    /// Bare file name of each member, parallel to `paths`.
    pub full_filenames: Vec<String>,
}

impl DuplicateGroup {
    /// Start a group from its first-seen member.
    pub fn new(
        hash: Fingerprint,
        path: impl Into<String>,
        file_name: impl Into<String>,
        size: u64,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            hash,
            full_filenames: vec![file_name.clone()],
            file_name,
            size,
            paths: vec![path.into()],
        }
    }

    /// Append a later member.
    pub fn push(&mut self, path: impl Into<String>, file_name: impl Into<String>) {
        self.paths.push(path.into());
        self.full_filenames.push(file_name.into());
    }

    /// Get the number of member files.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Space that removing all but one member would reclaim.
    pub fn wasted_bytes(&self) -> u64 {
        self.size * self.deletable_count() as u64
    }

    /// Whether members carry different file names.
    pub fn has_renamed_members(&self) -> bool {
        self.full_filenames.iter().any(|n| *n != self.file_name)
    }
}

//! Final scan output and the recommendation seam.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;
use crate::group::DuplicateGroup;
use crate::node::DirectoryNode;
use crate::stats::FileStats;

/// Advice derived from the statistics of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Short headline.
    pub title: String,
    /// What was observed.
    pub description: String,
    /// What to do about it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Link to follow for the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_link: Option<String>,
    /// Label for the action link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
}

impl Recommendation {
    /// Create a recommendation without suggestion or action.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            suggestion: None,
            action_link: None,
            action_text: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Produces recommendations from finalized statistics.
pub trait Recommender: Send + Sync {
    /// Evaluate the statistics and duplicate groups of one scan.
    fn recommend(&self, stats: &FileStats, duplicates: &[DuplicateGroup]) -> Vec<Recommendation>;
}

/// Complete output of one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Root of the scanned tree.
    pub root: DirectoryNode,

    /// Summary statistics.
    pub stats: FileStats,

    /// Groups with at least two members, in order of first discovery.
    pub duplicates: Vec<DuplicateGroup>,

    /// Advice for the user.
    pub recommendations: Vec<Recommendation>,

    /// Files that were counted but could not be fingerprinted.
    pub warnings: Vec<ScanWarning>,

    /// When this scan finished.
    pub scanned_at: DateTime<Utc>,

    /// Duration of the scan.
    pub scan_duration: Duration,
}

impl AnalysisResult {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Space reclaimable by keeping one member per group.
    pub fn wasted_bytes(&self) -> u64 {
        self.duplicates.iter().map(DuplicateGroup::wasted_bytes).sum()
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Look up a node by path.
    pub fn find(&self, path: &str) -> Option<&DirectoryNode> {
        self.root.find(path)
    }
}

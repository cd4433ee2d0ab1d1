//! Rule-based recommendations.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dirmap_core::{DuplicateGroup, FileStats, Recommendation, Recommender, format_bytes};

/// Thresholds for the recommendation rules. Each rule fires when the
/// observed value is strictly greater than its threshold.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct RecommendationConfig {
    /// Distinct extensions before suggesting organization by type.
    #[builder(default = "5")]
    pub max_file_types: usize,

    /// Directory depth before suggesting a flatter structure.
    #[builder(default = "5")]
    pub max_depth: u32,

    /// File count before suggesting splitting directories.
    #[builder(default = "1000")]
    pub max_files: u64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_file_types: 5,
            max_depth: 5,
            max_files: 1000,
        }
    }
}

impl RecommendationConfig {
    /// Create a new config builder.
    pub fn builder() -> RecommendationConfigBuilder {
        RecommendationConfigBuilder::default()
    }
}

/// Evaluates fixed rules over scan statistics.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator {
    config: RecommendationConfig,
}

impl RuleEvaluator {
    /// Create an evaluator with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator with custom thresholds.
    pub fn with_config(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// Active thresholds.
    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    fn duplicates(stats: &FileStats, duplicates: &[DuplicateGroup]) -> Option<Recommendation> {
        if duplicates.is_empty() {
            return None;
        }
        let wasted: u64 = duplicates.iter().map(DuplicateGroup::wasted_bytes).sum();
        Some(
            Recommendation::new(
                "Clean up duplicate files",
                format!(
                    "Found {} duplicate files that waste {} of storage.",
                    stats.duplicate_files,
                    format_bytes(wasted)
                ),
            )
            .with_suggestion(
                "Consider using a dedicated duplicate file cleaner to safely remove redundant files.",
            ),
        )
    }

    fn file_types(&self, stats: &FileStats) -> Option<Recommendation> {
        if stats.file_types.len() <= self.config.max_file_types {
            return None;
        }
        Some(
            Recommendation::new(
                "Organize by file types",
                format!(
                    "You have {} different file types. Consider organizing them into categories.",
                    stats.file_types.len()
                ),
            )
            .with_suggestion("Images → /Images\nDocuments → /Documents\nVideos → /Videos"),
        )
    }

    fn depth(&self, stats: &FileStats) -> Option<Recommendation> {
        if stats.max_depth <= self.config.max_depth {
            return None;
        }
        Some(
            Recommendation::new(
                "Simplify folder structure",
                format!(
                    "Your folder structure is quite deep (max depth: {}). Consider flattening it for easier navigation.",
                    stats.max_depth
                ),
            )
            .with_suggestion(
                "Try to aim for a maximum depth of 3-4 levels for frequently accessed files.",
            ),
        )
    }

    fn file_count(&self, stats: &FileStats) -> Option<Recommendation> {
        if stats.total_files <= self.config.max_files {
            return None;
        }
        Some(
            Recommendation::new(
                "Break down large directories",
                format!(
                    "You have {} files in total. Consider breaking down directories with many files.",
                    stats.total_files
                ),
            )
            .with_suggestion("Directories with more than 100 files should be split into subcategories."),
        )
    }
}

impl Recommender for RuleEvaluator {
    fn recommend(&self, stats: &FileStats, duplicates: &[DuplicateGroup]) -> Vec<Recommendation> {
        let recommendations: Vec<Recommendation> = [
            Self::duplicates(stats, duplicates),
            self.file_types(stats),
            self.depth(stats),
            self.file_count(stats),
        ]
        .into_iter()
        .flatten()
        .collect();

        debug!(count = recommendations.len(), "Generated recommendations");
        recommendations
    }
}

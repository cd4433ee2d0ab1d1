//! Scan configuration types.

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Which fields are folded into a fingerprint next to the content prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintScheme {
    /// Prefix bytes and size. Identical content groups regardless of name.
    #[default]
    ContentAndSize,
    /// Prefix bytes, file name and size. Renamed copies stay distinct.
    ContentNameAndSize,
}

/// Which members of a duplicate group get their node flagged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMarking {
    /// Only members found after the first one.
    #[default]
    LaterMembers,
    /// Every member of a surviving group, first-seen included.
    AllMembers,
}

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct ScanConfig {
    /// Number of leading bytes read for a fingerprint.
    #[builder(default = "1024")]
    pub fingerprint_prefix_len: usize,

    /// Fields folded into the fingerprint.
    #[builder(default)]
    pub fingerprint_scheme: FingerprintScheme,

    /// How duplicate files are flagged on their nodes.
    #[builder(default)]
    pub duplicate_marking: DuplicateMarking,

    /// Upper bound on concurrent reads against the source.
    #[builder(default = "32")]
    pub max_concurrent_reads: usize,

    /// Minimum wall-clock gap between throttled progress events.
    #[builder(default = "100")]
    pub progress_interval_ms: u64,

    /// Highest percentage reported while still scanning.
    #[builder(default = "95.0")]
    pub scanning_progress_cap: f64,

    /// Count entries before a handle-based scan for accurate percentages.
    #[builder(default = "true")]
    pub estimate_total_items: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    pub include_hidden: bool,

    /// Glob patterns matched against entry names to skip.
    #[builder(default)]
    pub ignore_patterns: Vec<String>,
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.fingerprint_prefix_len == Some(0) {
            return Err("Fingerprint prefix length must be positive".to_string());
        }
        if self.max_concurrent_reads == Some(0) {
            return Err("At least one concurrent read is required".to_string());
        }
        if let Some(cap) = self.scanning_progress_cap {
            if !(cap > 0.0 && cap <= 100.0) {
                return Err(format!("Progress cap {cap} outside (0, 100]"));
            }
        }
        if let Some(ref patterns) = self.ignore_patterns {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| format!("Bad ignore pattern {pattern}: {e}"))?;
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Check values that bypassed the builder (e.g. deserialized ones).
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.fingerprint_prefix_len == 0 {
            return Err(ScanError::InvalidConfig {
                message: "Fingerprint prefix length must be positive".to_string(),
            });
        }
        if self.max_concurrent_reads == 0 {
            return Err(ScanError::InvalidConfig {
                message: "At least one concurrent read is required".to_string(),
            });
        }
        if !(self.scanning_progress_cap > 0.0 && self.scanning_progress_cap <= 100.0) {
            return Err(ScanError::InvalidConfig {
                message: format!("Progress cap {} outside (0, 100]", self.scanning_progress_cap),
            });
        }
        self.ignore_set().map(|_| ())
    }

    /// Compile the ignore patterns.
    pub fn ignore_set(&self) -> Result<GlobSet, ScanError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignore_patterns {
            let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
                message: format!("Bad ignore pattern {pattern}: {e}"),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fingerprint_prefix_len: 1024,
            fingerprint_scheme: FingerprintScheme::default(),
            duplicate_marking: DuplicateMarking::default(),
            max_concurrent_reads: 32,
            progress_interval_ms: 100,
            scanning_progress_cap: 95.0,
            estimate_total_items: true,
            include_hidden: true,
            ignore_patterns: Vec::new(),
        }
    }
}

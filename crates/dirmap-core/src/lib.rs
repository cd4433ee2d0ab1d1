//! Core types and traits for dirmap.
//!
//! This crate provides the data model shared by the scanning pipeline and
//! its consumers: the directory tree, duplicate groups, statistics, the
//! analysis result and configuration.

mod config;
mod error;
mod format;
mod group;
mod node;
mod result;
mod stats;

pub use config::{DuplicateMarking, FingerprintScheme, ScanConfig, ScanConfigBuilder};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use format::format_bytes;
pub use group::DuplicateGroup;
pub use node::{DirectoryNode, Fingerprint, file_extension};
pub use result::{AnalysisResult, Recommendation, Recommender};
pub use stats::{FileStats, StatsAccumulator};

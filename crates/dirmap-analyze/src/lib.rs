//! Analysis on top of dirmap scan results.
//!
//! - **Recommendations** - Rule-based advice derived from scan statistics
//! - **Duplicate reports** - Groups ranked by reclaimable space
//!
//! # Recommendations
//!
//! [`RuleEvaluator`] implements [`Recommender`] and is handed to the scan
//! pipeline, which runs it during the analyzing stage:
//!
//! ```rust,ignore
//! use dirmap_analyze::RuleEvaluator;
//! use dirmap_scan::{ScanConfig, ScanPipeline};
//!
//! let pipeline = ScanPipeline::new(ScanConfig::default())?
//!     .with_recommender(RuleEvaluator::new());
//! let result = pipeline.scan_files(files).await?;
//!
//! for rec in &result.recommendations {
//!     println!("{}: {}", rec.title, rec.description);
//! }
//! ```
//!
//! # Duplicate Reports
//!
//! ```rust,ignore
//! use dirmap_analyze::DuplicateReport;
//!
//! let report = DuplicateReport::from_groups(&result.duplicates, 10);
//! println!("Found {} duplicate groups", report.group_count());
//! println!("Wasted space: {} bytes", report.total_wasted_space);
//! ```

mod duplicates;
mod recommend;

pub use duplicates::DuplicateReport;
pub use recommend::{RecommendationConfig, RecommendationConfigBuilder, RuleEvaluator};

// Re-export core types
pub use dirmap_core::{DuplicateGroup, FileStats, Recommendation, Recommender};

//! Directory scanning engine for dirmap.
//!
//! # Overview
//!
//! `dirmap-scan` walks a directory source, fingerprints every file from a
//! bounded content prefix, groups likely duplicates and accumulates
//! statistics. Key features:
//!
//! - **Two source shapes**: recursive directory handles with paginated
//!   listings, or flat pre-enumerated file lists
//! - **Bounded concurrency** for batch and file reads
//! - **Progress updates** via broadcast channels
//! - **Cancellation** through a shared token
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dirmap_scan::{FsDirectory, ScanConfig, ScanPipeline};
//!
//! # async fn run() -> Result<(), dirmap_scan::ScanError> {
//! let pipeline = ScanPipeline::new(ScanConfig::default())?;
//! let root = FsDirectory::open("/path/to/scan")?;
//! let result = pipeline.scan_directory(Arc::new(root)).await?;
//!
//! println!("Total size: {} bytes", result.stats.total_size);
//! println!("Duplicate groups: {}", result.duplicates.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use dirmap_scan::{ScanConfig, ScanPipeline};
//!
//! # fn run() -> Result<(), dirmap_scan::ScanError> {
//! let pipeline = ScanPipeline::new(ScanConfig::default())?;
//! let mut progress_rx = pipeline.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(progress) = progress_rx.recv().await {
//!         println!("{} {:.0}%", progress.stage, progress.percentage);
//!     }
//! });
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod demo;
mod filter;
mod fingerprint;
mod index;
mod pipeline;
mod progress;
pub mod source;

pub use builder::{TreeBuilder, collect_prefixes, directory_prefixes, split_relative_path};
pub use filter::EntryFilter;
pub use fingerprint::FingerprintEngine;
pub use index::DuplicateIndex;
pub use pipeline::{FALLBACK_TOTAL_ESTIMATE, FLAT_ROOT_NAME, ScanPipeline};
pub use progress::{
    ANALYZING_PERCENTAGE, PROGRESS_CHANNEL_SIZE, ProgressInfo, ProgressReporter, Stage,
};
pub use source::fs::{FsDirectory, FsFile, enumerate_files};
pub use source::memory::{MemoryDirectory, MemoryFile};
pub use source::{DirectorySource, EntryReader, FileSource, FlatFile, SourceEntry};

// Re-export core types for convenience
pub use dirmap_core::{
    AnalysisResult, DirectoryNode, DuplicateGroup, DuplicateMarking, FileStats, Fingerprint,
    FingerprintScheme, ScanConfig, ScanError, ScanWarning, WarningKind,
};

//! Scan orchestration.
//!
//! A [`ScanPipeline`] runs one scan per call through the stages
//! `scanning → analyzing → visualizing`. Both source shapes feed the same
//! fingerprinting, duplicate index and statistics, and share the
//! finalization step.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::Arc;
use std::time::Instant;

use futures::future::{self, BoxFuture};
use futures::{FutureExt, StreamExt, stream};
use tokio::sync::{Mutex, Semaphore, SemaphorePermit, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dirmap_core::{
    AnalysisResult, DirectoryNode, DuplicateMarking, Recommender, ScanConfig, ScanError,
    ScanWarning, StatsAccumulator, file_extension,
};

use crate::builder::{TreeBuilder, collect_prefixes, split_relative_path};
use crate::filter::EntryFilter;
use crate::fingerprint::FingerprintEngine;
use crate::index::DuplicateIndex;
use crate::progress::{PROGRESS_CHANNEL_SIZE, ProgressInfo, ProgressReporter};
use crate::source::{DirectorySource, EntryReader, FileSource, FlatFile, SourceEntry};

/// Item count assumed when the pre-count of a handle scan fails.
pub const FALLBACK_TOTAL_ESTIMATE: u64 = 100;

/// Name of the synthetic root built for flat-list scans.
pub const FLAT_ROOT_NAME: &str = "root";

/// Share of the flat-list progress spent on the prefix pre-scan.
const PRESCAN_SHARE: f64 = 30.0;

/// Share of the flat-list progress spent building nodes.
const BUILD_SHARE: f64 = 65.0;

/// Runs scans over directory sources.
pub struct ScanPipeline {
    config: ScanConfig,
    engine: FingerprintEngine,
    filter: EntryFilter,
    progress_tx: broadcast::Sender<ProgressInfo>,
    recommender: Option<Arc<dyn Recommender>>,
    cancel: CancellationToken,
}

impl ScanPipeline {
    /// Create a pipeline. Fails on invalid configuration.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Ok(Self {
            engine: FingerprintEngine::from_config(&config),
            filter: EntryFilter::from_config(&config)?,
            config,
            progress_tx,
            recommender: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Generate recommendations with `recommender` during analysis.
    pub fn with_recommender(mut self, recommender: impl Recommender + 'static) -> Self {
        self.recommender = Some(Arc::new(recommender));
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts running scans when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressInfo> {
        self.progress_tx.subscribe()
    }

    /// Active configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan by walking a directory handle recursively.
    ///
    /// Node paths have the form `/<root>/<child>/...` and the root itself
    /// counts as a directory at depth 0. Any directory listing failure
    /// aborts the scan; unreadable files are kept without a fingerprint.
    pub async fn scan_directory(
        &self,
        root: Arc<dyn DirectorySource>,
    ) -> Result<AnalysisResult, ScanError> {
        let started = Instant::now();
        let root_path = format!("/{}", root.name());
        info!(root = %root_path, "Starting directory scan");

        let reader = root
            .reader()
            .map_err(|err| ScanError::io(root_path.clone(), err))?;

        let total = if self.config.estimate_total_items {
            self.estimate_total(root.clone()).await?
        } else {
            FALLBACK_TOTAL_ESTIMATE
        };

        let mut reporter = ProgressReporter::from_config(self.progress_tx.clone(), &self.config);
        reporter.start(total);

        let traversal = Traversal {
            pipeline: self,
            permits: Semaphore::new(self.config.max_concurrent_reads),
            state: Mutex::new(ScanState {
                stats: StatsAccumulator::new(),
                warnings: Vec::new(),
                reporter,
                processed: 0,
                total,
            }),
        };

        let mut root_node = traversal.scan_dir(root, root_path, 0, Some(reader)).await?;
        let state = traversal.state.into_inner();

        // Reads complete in any order; group membership follows the tree.
        let mut index = DuplicateIndex::new();
        index.record_tree(&mut root_node);

        self.finalize(root_node, state.stats, index, state.warnings, state.reporter, started)
    }

    /// Scan a pre-enumerated list of files.
    ///
    /// Intermediate directories are synthesized below a root named
    /// [`FLAT_ROOT_NAME`] with the empty path; the synthetic root is not
    /// counted. Node paths are the normalized relative paths.
    pub async fn scan_files(
        &self,
        files: Vec<Arc<dyn FlatFile>>,
    ) -> Result<AnalysisResult, ScanError> {
        let started = Instant::now();
        let files: Vec<Arc<dyn FlatFile>> = files
            .into_iter()
            .filter(|file| {
                let relative_path = file.relative_path();
                if split_relative_path(relative_path).1.is_empty() {
                    warn!(path = %relative_path, "Skipping flat entry without a file name");
                    return false;
                }
                self.filter.allows_path(relative_path)
            })
            .collect();
        let total = files.len() as u64;
        info!(files = total, "Starting flat-list scan");

        let mut reporter = ProgressReporter::from_config(self.progress_tx.clone(), &self.config);
        reporter.start(total);

        // First pass: count distinct directories.
        let mut prefixes = HashSet::new();
        for (i, file) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            collect_prefixes(file.relative_path(), &mut prefixes);
            let percentage = (i + 1) as f64 / total.max(1) as f64 * PRESCAN_SHARE;
            reporter.scanning(file.relative_path(), 0, percentage);
        }
        debug!(directories = prefixes.len(), "Counted directory prefixes");

        // Second pass: build nodes while fingerprints arrive in input order.
        let mut builder = TreeBuilder::with_capacity(FLAT_ROOT_NAME, prefixes.len());
        let mut stats = StatsAccumulator::new();
        let mut index = DuplicateIndex::new();
        let mut warnings = Vec::new();

        let engine = self.engine;
        let mut fingerprints = stream::iter(files)
            .map(|file| async move {
                let result = engine.fingerprint(file.as_ref()).await;
                (file, result)
            })
            .buffered(self.config.max_concurrent_reads);

        let mut processed = 0u64;
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(ScanError::Cancelled),
                next = fingerprints.next() => next,
            };
            let Some((file, result)) = next else {
                break;
            };

            let (dirs, name) = split_relative_path(file.relative_path());
            let path = if dirs.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", dirs.join("/"), name)
            };
            let dir = builder.ensure_dir(&dirs, |_, depth| stats.record_dir(depth));

            let size = file.size();
            stats.record_file(size, &file_extension(name));
            let node = DirectoryNode::new_file(name, path.as_str(), size);
            let node = match result {
                Ok(fingerprint) => {
                    let duplicate = index.record(&fingerprint, &path, name, size);
                    node.with_fingerprint(fingerprint, duplicate)
                }
                Err(err) => {
                    warn!(path = %path, error = %err, "Could not read file, keeping it unfingerprinted");
                    warnings.push(ScanWarning::read_error(path.as_str(), &err));
                    node
                }
            };
            builder.push_file(dir, node);

            processed += 1;
            let percentage =
                PRESCAN_SHARE + processed as f64 / total.max(1) as f64 * BUILD_SHARE;
            reporter.scanning(&path, processed, percentage);
        }

        self.finalize(builder.build(), stats, index, warnings, reporter, started)
    }

    fn finalize(
        &self,
        mut root: DirectoryNode,
        stats: StatsAccumulator,
        index: DuplicateIndex,
        warnings: Vec<ScanWarning>,
        mut reporter: ProgressReporter,
        started: Instant,
    ) -> Result<AnalysisResult, ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        reporter.analyzing("Finalizing analysis...");

        let duplicates = index.finalize();
        if self.config.duplicate_marking == DuplicateMarking::AllMembers {
            let members: HashSet<&str> = duplicates
                .iter()
                .flat_map(|group| group.paths.iter().map(String::as_str))
                .collect();
            root.mark_duplicates(&members);
        }

        let stats = stats.finalize(&duplicates);
        let recommendations = self
            .recommender
            .as_ref()
            .map(|recommender| recommender.recommend(&stats, &duplicates))
            .unwrap_or_default();

        reporter.finish();
        let scan_duration = started.elapsed();
        info!(
            files = stats.total_files,
            dirs = stats.total_dirs,
            bytes = stats.total_size,
            duplicate_groups = duplicates.len(),
            warnings = warnings.len(),
            elapsed_ms = scan_duration.as_millis() as u64,
            "Scan complete"
        );

        Ok(AnalysisResult {
            root,
            stats,
            duplicates,
            recommendations,
            warnings,
            scanned_at: chrono::Utc::now(),
            scan_duration,
        })
    }

    /// Count the entries below `root` for percentage reporting. Falls back
    /// to [`FALLBACK_TOTAL_ESTIMATE`] when counting fails.
    async fn estimate_total(&self, root: Arc<dyn DirectorySource>) -> Result<u64, ScanError> {
        let counted = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ScanError::Cancelled),
            counted = self.count_entries(root) => counted,
        };
        match counted {
            Ok(total) => {
                debug!(total, "Estimated item count");
                Ok(total)
            }
            Err(err) => {
                warn!(error = %err, fallback = FALLBACK_TOTAL_ESTIMATE, "Could not pre-count entries");
                Ok(FALLBACK_TOTAL_ESTIMATE)
            }
        }
    }

    async fn count_entries(&self, root: Arc<dyn DirectorySource>) -> io::Result<u64> {
        let mut pending = VecDeque::from([root]);
        let mut count = 0u64;
        while let Some(dir) = pending.pop_front() {
            let mut reader = dir.reader()?;
            loop {
                let batch = reader.next_batch().await?;
                if batch.is_empty() {
                    break;
                }
                for entry in batch {
                    if !self.filter.allows(entry.name()) {
                        continue;
                    }
                    count += 1;
                    if let SourceEntry::Directory(child) = entry {
                        pending.push_back(child);
                    }
                }
            }
        }
        Ok(count)
    }
}

struct ScanState {
    stats: StatsAccumulator,
    warnings: Vec<ScanWarning>,
    reporter: ProgressReporter,
    processed: u64,
    total: u64,
}

impl ScanState {
    fn advance(&mut self, label: &str) {
        self.processed += 1;
        let percentage = self.processed as f64 / self.total.max(1) as f64 * 100.0;
        self.reporter.scanning(label, self.processed, percentage);
    }
}

/// One handle-based traversal. The state lock is never held across an await.
struct Traversal<'a> {
    pipeline: &'a ScanPipeline,
    permits: Semaphore,
    state: Mutex<ScanState>,
}

impl Traversal<'_> {
    fn scan_dir<'s>(
        &'s self,
        dir: Arc<dyn DirectorySource>,
        path: String,
        depth: u32,
        reader: Option<Box<dyn EntryReader>>,
    ) -> BoxFuture<'s, Result<DirectoryNode, ScanError>> {
        async move {
            self.state.lock().await.stats.record_dir(depth);

            let mut reader = match reader {
                Some(reader) => reader,
                None => dir
                    .reader()
                    .map_err(|err| ScanError::io(path.clone(), err))?,
            };

            let mut entries = Vec::new();
            loop {
                let batch = self.read_batch(reader.as_mut(), &path).await?;
                if batch.is_empty() {
                    break;
                }
                entries.extend(
                    batch
                        .into_iter()
                        .filter(|entry| self.pipeline.filter.allows(entry.name())),
                );
            }
            drop(reader);

            let children = future::try_join_all(entries.into_iter().map(|entry| {
                let child_path = format!("{path}/{}", entry.name());
                match entry {
                    SourceEntry::Directory(child) => {
                        self.scan_dir(child, child_path, depth + 1, None)
                    }
                    SourceEntry::File(file) => self.scan_file(file, child_path).boxed(),
                }
            }))
            .await?;

            let mut node = DirectoryNode::new_directory(dir.name(), path);
            for child in children {
                node.push_child(child);
            }
            if depth > 0 {
                self.state.lock().await.advance(dir.name());
            }
            Ok(node)
        }
        .boxed()
    }

    async fn scan_file(
        &self,
        file: Arc<dyn FileSource>,
        path: String,
    ) -> Result<DirectoryNode, ScanError> {
        let result = {
            let _permit = self.acquire().await?;
            tokio::select! {
                biased;
                _ = self.pipeline.cancel.cancelled() => return Err(ScanError::Cancelled),
                result = self.pipeline.engine.fingerprint(file.as_ref()) => result,
            }
        };

        let name = file.name();
        let size = file.size();
        let node = DirectoryNode::new_file(name, path.as_str(), size);

        let mut state = self.state.lock().await;
        state.stats.record_file(size, &file_extension(name));
        let node = match result {
            Ok(fingerprint) => node.with_fingerprint(fingerprint, false),
            Err(err) => {
                warn!(path = %path, error = %err, "Could not read file, keeping it unfingerprinted");
                state.warnings.push(ScanWarning::read_error(path.as_str(), &err));
                node
            }
        };
        state.advance(name);
        Ok(node)
    }

    async fn read_batch(
        &self,
        reader: &mut dyn EntryReader,
        path: &str,
    ) -> Result<Vec<SourceEntry>, ScanError> {
        let _permit = self.acquire().await?;
        tokio::select! {
            biased;
            _ = self.pipeline.cancel.cancelled() => Err(ScanError::Cancelled),
            batch = reader.next_batch() => batch.map_err(|err| ScanError::Traversal {
                path: path.to_string(),
                message: err.to_string(),
            }),
        }
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>, ScanError> {
        tokio::select! {
            biased;
            _ = self.pipeline.cancel.cancelled() => Err(ScanError::Cancelled),
            permit = self.permits.acquire() => permit.map_err(|_| ScanError::Other {
                message: "read limiter closed".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::{MemoryDirectory, MemoryFile};

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let config = ScanConfig {
            max_concurrent_reads: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(
            ScanPipeline::new(config),
            Err(ScanError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_estimate_counts_every_entry() {
        let pipeline = ScanPipeline::new(ScanConfig::default()).unwrap();
        let root = MemoryDirectory::from_files(
            "root",
            vec![
                MemoryFile::new("a/x.txt", "A"),
                MemoryFile::new("a/b/y.txt", "B"),
                MemoryFile::new("z.txt", "C"),
            ],
        );
        let total = pipeline.estimate_total(Arc::new(root)).await.unwrap();
        // a, a/x.txt, a/b, a/b/y.txt, z.txt
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_estimate_falls_back_on_failure() {
        let pipeline = ScanPipeline::new(ScanConfig::default()).unwrap();
        let root = MemoryDirectory::new("root").failing();
        let total = pipeline.estimate_total(Arc::new(root)).await.unwrap();
        assert_eq!(total, FALLBACK_TOTAL_ESTIMATE);
    }
}

//! Scan progress reporting.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::broadcast;
use tracing::trace;

use dirmap_core::ScanConfig;

/// Capacity of the progress broadcast channel.
pub const PROGRESS_CHANNEL_SIZE: usize = 256;

/// Percentage reported while finalizing.
pub const ANALYZING_PERCENTAGE: f64 = 97.0;

/// Phase of the scan lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// No scan running.
    #[default]
    Idle,
    /// Traversing and fingerprinting.
    Scanning,
    /// Finalizing groups, statistics and recommendations.
    Analyzing,
    /// Done; the result is ready to display.
    Visualizing,
}

/// Progress snapshot published during a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    /// Current stage.
    pub stage: Stage,
    /// Completion in percent, within 0..=100.
    pub percentage: f64,
    /// Label of the item being processed.
    pub current_file: String,
    /// Items processed so far.
    pub processed_items: u64,
    /// Expected item count. May be an estimate.
    pub total_items: u64,
    /// Seconds left, unknown until something has been processed.
    pub estimated_time_remaining: Option<f64>,
}

impl ProgressInfo {
    /// The state before any scan.
    pub fn idle() -> Self {
        Self {
            stage: Stage::Idle,
            percentage: 0.0,
            current_file: String::new(),
            processed_items: 0,
            total_items: 0,
            estimated_time_remaining: None,
        }
    }

    /// Whether a scan is in flight.
    pub fn is_processing(&self) -> bool {
        matches!(self.stage, Stage::Scanning | Stage::Analyzing)
    }
}

impl Default for ProgressInfo {
    fn default() -> Self {
        Self::idle()
    }
}

/// Throttles, caps and publishes progress for one scan.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: broadcast::Sender<ProgressInfo>,
    started: Instant,
    last_emit: Option<Instant>,
    interval: Duration,
    cap: f64,
    current: ProgressInfo,
}

impl ProgressReporter {
    /// Create a reporter publishing on `tx`.
    pub fn new(tx: broadcast::Sender<ProgressInfo>, interval: Duration, cap: f64) -> Self {
        Self {
            tx,
            started: Instant::now(),
            last_emit: None,
            interval,
            cap: cap.clamp(0.0, 100.0),
            current: ProgressInfo::idle(),
        }
    }

    /// Create a reporter using the interval and cap from `config`.
    pub fn from_config(tx: broadcast::Sender<ProgressInfo>, config: &ScanConfig) -> Self {
        Self::new(
            tx,
            Duration::from_millis(config.progress_interval_ms),
            config.scanning_progress_cap,
        )
    }

    /// Reset timing and publish the 0% scanning event.
    pub fn start(&mut self, total_items: u64) {
        self.started = Instant::now();
        self.current = ProgressInfo {
            stage: Stage::Scanning,
            percentage: 0.0,
            current_file: "Starting analysis...".to_string(),
            processed_items: 0,
            total_items,
            estimated_time_remaining: None,
        };
        self.emit();
    }

    /// Record scanning progress. Published at most once per interval and
    /// never above the scanning cap.
    pub fn scanning(&mut self, current_file: &str, processed_items: u64, percentage: f64) {
        let percentage = if percentage.is_finite() {
            percentage.clamp(0.0, self.cap)
        } else {
            0.0
        };
        self.current.stage = Stage::Scanning;
        self.current.percentage = percentage;
        self.current.processed_items = processed_items;
        self.current.estimated_time_remaining = Self::estimate_remaining(
            self.started.elapsed(),
            processed_items,
            self.current.total_items,
        );
        if !current_file.is_empty() {
            self.current.current_file.clear();
            self.current.current_file.push_str(current_file);
        }

        if self.is_due() {
            self.emit();
        }
    }

    /// Publish the analyzing event.
    pub fn analyzing(&mut self, message: &str) {
        self.current.stage = Stage::Analyzing;
        self.current.percentage = ANALYZING_PERCENTAGE;
        self.current.current_file = message.to_string();
        self.emit();
    }

    /// Publish the completion event.
    pub fn finish(&mut self) {
        self.current = ProgressInfo {
            stage: Stage::Visualizing,
            percentage: 100.0,
            current_file: "Ready!".to_string(),
            processed_items: self.current.total_items,
            total_items: self.current.total_items,
            estimated_time_remaining: Some(0.0),
        };
        self.emit();
    }

    /// Remaining seconds extrapolated from the mean time per item.
    pub fn estimate_remaining(elapsed: Duration, processed: u64, total: u64) -> Option<f64> {
        if processed == 0 {
            return None;
        }
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let remaining = total.saturating_sub(processed) as f64;
        Some(elapsed_ms / processed as f64 * remaining / 1000.0)
    }

    fn is_due(&self) -> bool {
        self.last_emit
            .is_none_or(|last| last.elapsed() >= self.interval)
    }

    fn emit(&mut self) {
        self.last_emit = Some(Instant::now());
        trace!(
            stage = %self.current.stage,
            percentage = self.current.percentage,
            processed = self.current.processed_items,
            total = self.current.total_items,
            "progress"
        );
        // No subscribers is fine.
        let _ = self.tx.send(self.current.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter(interval: Duration) -> (ProgressReporter, broadcast::Receiver<ProgressInfo>) {
        let (tx, rx) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        (ProgressReporter::new(tx, interval, 95.0), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<ProgressInfo>) -> Vec<ProgressInfo> {
        let mut events = Vec::new();
        while let Ok(info) = rx.try_recv() {
            events.push(info);
        }
        events
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Scanning.to_string(), "scanning");
        assert_eq!(Stage::Visualizing.to_string(), "visualizing");
        assert_eq!(Stage::default(), Stage::Idle);
    }

    #[test]
    fn test_throttle_keeps_start_and_end() {
        let (mut reporter, mut rx) = reporter(Duration::from_secs(3600));
        reporter.start(10);
        for i in 1..=10 {
            reporter.scanning("file", i, i as f64 * 10.0);
        }
        reporter.analyzing("Finalizing analysis...");
        reporter.finish();

        let events = drain(&mut rx);
        let stages: Vec<Stage> = events.iter().map(|e| e.stage).collect();
        assert_eq!(stages, vec![Stage::Scanning, Stage::Analyzing, Stage::Visualizing]);
        assert_eq!(events[0].percentage, 0.0);
        assert_eq!(events[2].percentage, 100.0);
        assert_eq!(events[2].processed_items, 10);
        assert_eq!(events[2].estimated_time_remaining, Some(0.0));
    }

    #[test]
    fn test_scanning_is_capped() {
        let (mut reporter, mut rx) = reporter(Duration::ZERO);
        reporter.start(4);
        reporter.scanning("a", 2, 50.0);
        reporter.scanning("b", 4, 100.0);
        reporter.scanning("c", 5, 250.0);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 4);
        assert!(events
            .iter()
            .filter(|e| e.stage == Stage::Scanning)
            .all(|e| e.percentage <= 95.0));
        assert_eq!(events[2].percentage, 95.0);
        assert_eq!(events[2].current_file, "b");
    }

    #[test]
    fn test_estimate_remaining() {
        assert_eq!(ProgressReporter::estimate_remaining(Duration::from_secs(1), 0, 10), None);

        let eta = ProgressReporter::estimate_remaining(Duration::from_secs(2), 4, 10).unwrap();
        assert!((eta - 3.0).abs() < 1e-9);

        let eta = ProgressReporter::estimate_remaining(Duration::from_secs(2), 12, 10).unwrap();
        assert_eq!(eta, 0.0);
    }

    #[test]
    fn test_idle_info() {
        let info = ProgressInfo::default();
        assert_eq!(info.stage, Stage::Idle);
        assert!(!info.is_processing());
        assert_eq!(info.estimated_time_remaining, None);
    }
}

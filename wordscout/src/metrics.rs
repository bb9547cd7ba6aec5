use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::ErrorKind;
use crate::results::SearchSummary;

/// Counters shared by the walker and every scan task of one run
#[derive(Debug, Default)]
pub struct ScanMetrics {
    dirs_visited: AtomicU64,
    files_discovered: AtomicU64,
    files_scanned: AtomicU64,
    files_with_matches: AtomicU64,
    lines_scanned: AtomicU64,
    lines_matched: AtomicU64,
    entries_skipped: AtomicU64,

    traversal_errors: AtomicU64,
    open_errors: AtomicU64,
    scan_errors: AtomicU64,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_directory(&self) {
        self.dirs_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discovered(&self) {
        self.files_discovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.entries_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a finished file scan
    pub fn record_file_scanned(&self, lines: u64, matched: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        self.lines_scanned.fetch_add(lines, Ordering::Relaxed);
        if matched > 0 {
            self.files_with_matches.fetch_add(1, Ordering::Relaxed);
            self.lines_matched.fetch_add(matched, Ordering::Relaxed);
        }
        debug!("Scanned {} lines, {} matched", lines, matched);
    }

    /// Counts a recoverable error under its kind
    pub fn record_error(&self, kind: ErrorKind) {
        let counter = match kind {
            ErrorKind::Traversal => &self.traversal_errors,
            ErrorKind::FileOpen => &self.open_errors,
            ErrorKind::Scan => &self.scan_errors,
            // Fatal errors end the run before anything is counted
            ErrorKind::Configuration => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the counters
    pub fn summary(&self, peak_concurrency: usize, elapsed: Duration, cancelled: bool) -> SearchSummary {
        SearchSummary {
            dirs_visited: self.dirs_visited.load(Ordering::Relaxed),
            files_discovered: self.files_discovered.load(Ordering::Relaxed),
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_with_matches: self.files_with_matches.load(Ordering::Relaxed),
            lines_scanned: self.lines_scanned.load(Ordering::Relaxed),
            lines_matched: self.lines_matched.load(Ordering::Relaxed),
            entries_skipped: self.entries_skipped.load(Ordering::Relaxed),
            traversal_errors: self.traversal_errors.load(Ordering::Relaxed),
            open_errors: self.open_errors.load(Ordering::Relaxed),
            scan_errors: self.scan_errors.load(Ordering::Relaxed),
            peak_concurrency,
            elapsed,
            cancelled,
        }
    }

    /// Logs the counters at info level
    pub fn log_stats(&self) {
        info!(
            "Scan stats:\n\
             Directories visited: {}\n\
             Files discovered/scanned/with matches: {}/{}/{}\n\
             Lines scanned/matched: {}/{}\n\
             Entries skipped: {}\n\
             Errors (traversal/open/scan): {}/{}/{}",
            self.dirs_visited.load(Ordering::Relaxed),
            self.files_discovered.load(Ordering::Relaxed),
            self.files_scanned.load(Ordering::Relaxed),
            self.files_with_matches.load(Ordering::Relaxed),
            self.lines_scanned.load(Ordering::Relaxed),
            self.lines_matched.load(Ordering::Relaxed),
            self.entries_skipped.load(Ordering::Relaxed),
            self.traversal_errors.load(Ordering::Relaxed),
            self.open_errors.load(Ordering::Relaxed),
            self.scan_errors.load(Ordering::Relaxed),
        );
    }
}

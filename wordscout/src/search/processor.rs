use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

use super::gate::ScanPermit;
use super::matcher::WordMatcher;
use crate::errors::{SearchError, SearchResult};
use crate::metrics::ScanMetrics;
use crate::results::MatchReport;
use crate::sink::MatchSink;

const BUFFER_CAPACITY: usize = 64 * 1024;
const LINE_CAPACITY: usize = 256;

/// An opened file waiting to be scanned.
///
/// The task owns both the file handle and the admission slot; both are
/// released when the task is dropped, whichever way the scan ends.
#[derive(Debug)]
pub struct FileTask<'a> {
    path: PathBuf,
    reader: BufReader<File>,
    _permit: ScanPermit<'a>,
}

impl<'a> FileTask<'a> {
    /// Opens `path` under an already acquired slot.
    ///
    /// On failure the permit is dropped here, so the slot is free again
    /// before the error reaches the caller.
    pub fn open(path: PathBuf, permit: ScanPermit<'a>) -> SearchResult<Self> {
        match File::open(&path) {
            Ok(file) => Ok(Self {
                reader: BufReader::with_capacity(BUFFER_CAPACITY, file),
                path,
                _permit: permit,
            }),
            Err(e) => Err(SearchError::file_open(path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of scanning one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub lines_scanned: u64,
    pub lines_matched: u64,
    /// The scan stopped early because the run was cancelled
    pub cancelled: bool,
}

/// Strips a trailing `\n` or `\r\n`
fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Reads `reader` line by line and reports every line with a whole-word match.
///
/// Lines are read into a growable buffer, so a line of any length is matched
/// in full. Reports for one file come out in line order, at most one per line.
pub fn scan_lines<R, S>(
    mut reader: R,
    path: &Path,
    matcher: &WordMatcher,
    sink: &S,
    shutdown: &AtomicBool,
) -> SearchResult<ScanOutcome>
where
    R: BufRead,
    S: MatchSink + ?Sized,
{
    let mut outcome = ScanOutcome::default();
    let mut line = Vec::with_capacity(LINE_CAPACITY);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            outcome.cancelled = true;
            break;
        }

        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| SearchError::scan(path, outcome.lines_scanned, e))?;
        if read == 0 {
            break;
        }

        let line_number = outcome.lines_scanned;
        outcome.lines_scanned += 1;

        let text = strip_line_terminator(&line);
        if matcher.is_match(text) {
            trace!("Match at {}:{}", path.display(), line_number);
            sink.report(&MatchReport::new(path, line_number, text))
                .map_err(|e| SearchError::output(path, line_number, e))?;
            outcome.lines_matched += 1;
        }
    }

    Ok(outcome)
}

/// Runs scan tasks and reports failures.
///
/// One processor is shared by reference with every task of a run.
pub struct FileProcessor<'a, S: ?Sized> {
    matcher: &'a WordMatcher,
    sink: &'a S,
    metrics: &'a ScanMetrics,
    shutdown: &'a AtomicBool,
}

impl<'a, S: MatchSink + ?Sized> FileProcessor<'a, S> {
    pub fn new(
        matcher: &'a WordMatcher,
        sink: &'a S,
        metrics: &'a ScanMetrics,
        shutdown: &'a AtomicBool,
    ) -> Self {
        Self {
            matcher,
            sink,
            metrics,
            shutdown,
        }
    }

    /// Scans one file, then releases its handle and slot
    pub fn process(&self, task: FileTask<'_>) {
        trace!("Scanning file: {}", task.path.display());
        let FileTask {
            path,
            reader,
            _permit,
        } = task;

        match scan_lines(reader, &path, self.matcher, self.sink, self.shutdown) {
            Ok(outcome) => {
                self.metrics
                    .record_file_scanned(outcome.lines_scanned, outcome.lines_matched);
            }
            Err(err) => self.report_error(&err),
        }
    }

    /// Logs, counts and forwards a recoverable error
    pub fn report_error(&self, error: &SearchError) {
        debug!("Recoverable error: {}", error);
        self.metrics.record_error(error.kind());
        self.sink.error(error);
    }
}

/// Search result types.
///
/// A scan task hands each matching line to the sink as a borrowed
/// [`MatchReport`], which costs no allocation on the hot path. Sinks that keep
/// results, such as [`crate::sink::CollectingSink`], turn reports into the owned
/// [`Match`] and [`FileResult`] values collected in a [`SearchOutput`].
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One matching line, as produced by a scan task.
///
/// Line numbers are 0-based. `line` holds the raw bytes of the line without
/// its `\n` or `\r\n` terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchReport<'a> {
    pub path: &'a Path,
    pub line_number: u64,
    pub line: &'a [u8],
}

impl<'a> MatchReport<'a> {
    pub fn new(path: &'a Path, line_number: u64, line: &'a [u8]) -> Self {
        Self {
            path,
            line_number,
            line,
        }
    }

    /// The line decoded as UTF-8, with invalid sequences replaced
    pub fn line_text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.line)
    }
}

impl fmt::Display for MatchReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.path.display(),
            self.line_number,
            self.line_text()
        )
    }
}

/// An owned matching line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// 0-based line number
    pub line_number: u64,
    /// The content of the line, lossily decoded
    pub line_content: String,
}

impl From<&MatchReport<'_>> for Match {
    fn from(report: &MatchReport<'_>) -> Self {
        Self {
            line_number: report.line_number,
            line_content: report.line_text().into_owned(),
        }
    }
}

/// All matches found in a single file, in line order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub path: PathBuf,
    pub matches: Vec<Match>,
}

/// Results collected from a whole run
#[derive(Debug, Clone, Default)]
pub struct SearchOutput {
    /// Files with at least one match, sorted by path
    pub file_results: Vec<FileResult>,
    /// Total number of matching lines
    pub total_matches: usize,
    /// Number of files with at least one match
    pub files_with_matches: usize,
    /// Errors reported during the run, rendered as text
    pub errors: Vec<String>,
    /// Counters for the run
    pub summary: SearchSummary,
}

impl SearchOutput {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a file result to the output
    pub fn add_file_result(&mut self, file_result: FileResult) {
        if !file_result.matches.is_empty() {
            self.total_matches += file_result.matches.len();
            self.files_with_matches += 1;
        }
        self.file_results.push(file_result);
    }

    /// Looks up the result for `path`
    pub fn file(&self, path: &Path) -> Option<&FileResult> {
        self.file_results.iter().find(|r| r.path == path)
    }
}

/// Counters describing a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub dirs_visited: u64,
    pub files_discovered: u64,
    pub files_scanned: u64,
    pub files_with_matches: u64,
    pub lines_scanned: u64,
    pub lines_matched: u64,
    /// Files left out by extension or ignore filters, and special files
    pub entries_skipped: u64,
    pub traversal_errors: u64,
    pub open_errors: u64,
    pub scan_errors: u64,
    /// Highest number of files that were being scanned at the same time
    pub peak_concurrency: usize,
    pub elapsed: Duration,
    /// Whether the run was stopped through its shutdown flag
    pub cancelled: bool,
}

impl SearchSummary {
    pub fn total_errors(&self) -> u64 {
        self.traversal_errors + self.open_errors + self.scan_errors
    }
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Round to milliseconds so the output stays short
        let elapsed = Duration::from_millis(self.elapsed.as_millis() as u64);
        writeln!(
            f,
            "Found {} matching lines in {} of {} files ({} directories) in {}",
            self.lines_matched,
            self.files_with_matches,
            self.files_scanned,
            self.dirs_visited,
            humantime::format_duration(elapsed)
        )?;
        write!(
            f,
            "Errors (traversal/open/scan): {}/{}/{}, skipped: {}, peak concurrent scans: {}",
            self.traversal_errors,
            self.open_errors,
            self.scan_errors,
            self.entries_skipped,
            self.peak_concurrency
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// Output sinks for match reports.
///
/// Every scan task writes into the same sink, so implementations must be
/// `Sync` and must emit one report as a single unit: a reader never sees half
/// of one report line mixed with another. Reports from different files may
/// still come in any order.
use colored::Colorize;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::{self, Stderr, Stdout, Write};
use std::path::PathBuf;

use crate::errors::SearchError;
use crate::results::{FileResult, Match, MatchReport, SearchOutput};

/// Destination for match reports and recoverable errors
pub trait MatchSink: Sync {
    /// Records one matching line
    fn report(&self, report: &MatchReport<'_>) -> io::Result<()>;

    /// Records an error that did not stop the run
    fn error(&self, error: &SearchError);
}

/// Writes `path:line:text` lines to one writer and errors to another
#[derive(Debug)]
pub struct WriterSink<W, E> {
    out: Mutex<W>,
    err: Mutex<E>,
    color: bool,
}

impl WriterSink<Stdout, Stderr> {
    /// Reports go to stdout, errors to stderr
    pub fn stdout() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write + Send, E: Write + Send> WriterSink<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            color: false,
        }
    }

    /// Paints the path and line number of each report
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Flushes both writers
    pub fn flush(&self) -> io::Result<()> {
        self.out.lock().flush()?;
        self.err.lock().flush()
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out.into_inner(), self.err.into_inner())
    }

    fn format(&self, report: &MatchReport<'_>) -> Vec<u8> {
        let mut buf = Vec::with_capacity(report.line.len() + 64);
        let path = report.path.display().to_string();
        if self.color {
            // Writing into a Vec cannot fail
            let _ = write!(
                buf,
                "{}:{}:",
                path.cyan(),
                report.line_number.to_string().green()
            );
        } else {
            let _ = write!(buf, "{}:{}:", path, report.line_number);
        }
        buf.extend_from_slice(report.line);
        buf.push(b'\n');
        buf
    }
}

impl<W: Write + Send, E: Write + Send> MatchSink for WriterSink<W, E> {
    fn report(&self, report: &MatchReport<'_>) -> io::Result<()> {
        let line = self.format(report);
        self.out.lock().write_all(&line)
    }

    fn error(&self, error: &SearchError) {
        let mut err = self.err.lock();
        // Nowhere left to report a failure to write to the error stream
        let _ = writeln!(err, "wordscout: {}", error);
    }
}

/// Keeps every report in memory, grouped by file
#[derive(Debug, Default)]
pub struct CollectingSink {
    files: Mutex<BTreeMap<PathBuf, Vec<Match>>>,
    errors: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of reports collected so far
    pub fn len(&self) -> usize {
        self.files.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the collected reports into a [`SearchOutput`], sorted by path
    pub fn into_output(self) -> SearchOutput {
        let mut output = SearchOutput::new();
        for (path, matches) in self.files.into_inner() {
            output.add_file_result(FileResult { path, matches });
        }
        output.errors = self.errors.into_inner();
        output
    }
}

impl MatchSink for CollectingSink {
    fn report(&self, report: &MatchReport<'_>) -> io::Result<()> {
        self.files
            .lock()
            .entry(report.path.to_path_buf())
            .or_default()
            .push(Match::from(report));
        Ok(())
    }

    fn error(&self, error: &SearchError) {
        self.errors.lock().push(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_writer_sink_format() {
        let sink = WriterSink::new(Vec::new(), Vec::new());
        sink.report(&MatchReport::new(Path::new("root/a.txt"), 0, b"the cat"))
            .unwrap();
        sink.report(&MatchReport::new(Path::new("root/b.txt"), 7, b"cat \xff"))
            .unwrap();
        sink.error(&SearchError::NoSearchTerms);

        let (out, err) = sink.into_inner();
        assert_eq!(out, b"root/a.txt:0:the cat\nroot/b.txt:7:cat \xff\n".to_vec());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "wordscout: No search terms provided\n"
        );
    }

    #[test]
    fn test_writer_sink_lines_do_not_interleave() {
        let sink = Arc::new(WriterSink::new(Vec::new(), Vec::new()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    let path = PathBuf::from(format!("file{}.txt", i));
                    let line = format!("word {}", "x".repeat(512));
                    for n in 0..100 {
                        sink.report(&MatchReport::new(&path, n, line.as_bytes()))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sink = Arc::try_unwrap(sink).unwrap();
        let (out, _) = sink.into_inner();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 800);
        for line in text.lines() {
            let mut parts = line.splitn(3, ':');
            assert!(parts.next().unwrap().starts_with("file"));
            assert!(parts.next().unwrap().parse::<u64>().is_ok());
            assert_eq!(parts.next().unwrap().len(), 5 + 512);
        }
    }

    #[test]
    fn test_collecting_sink_groups_by_file() {
        let sink = CollectingSink::new();
        sink.report(&MatchReport::new(Path::new("b.txt"), 0, b"a fat cat"))
            .unwrap();
        sink.report(&MatchReport::new(Path::new("a.txt"), 0, b"the cat"))
            .unwrap();
        sink.report(&MatchReport::new(Path::new("a.txt"), 2, b"cat"))
            .unwrap();
        sink.error(&SearchError::config_error("oops"));
        assert_eq!(sink.len(), 3);

        let output = sink.into_output();
        assert_eq!(output.files_with_matches, 2);
        assert_eq!(output.total_matches, 3);
        assert_eq!(output.file_results[0].path, PathBuf::from("a.txt"));
        assert_eq!(output.file_results[0].matches[1].line_number, 2);
        assert_eq!(output.errors, vec!["Configuration error: oops".to_string()]);
    }
}

use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::gate::AdmissionGate;
use super::matcher::WordMatcher;
use super::processor::FileProcessor;
use super::walker::Walker;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::filters::FileFilter;
use crate::metrics::ScanMetrics;
use crate::results::{SearchOutput, SearchSummary};
use crate::sink::{CollectingSink, MatchSink};

/// A validated search, ready to run.
///
/// All configuration problems surface from [`Searcher::new`], before any
/// directory is read.
pub struct Searcher {
    config: SearchConfig,
    matcher: WordMatcher,
    filter: FileFilter,
    shutdown: Arc<AtomicBool>,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> SearchResult<Self> {
        config.validate()?;
        let matcher = WordMatcher::new(&config.terms, config.case_mode)?;
        let filter = FileFilter::new(config.file_extensions.clone(), &config.ignore_patterns)?;

        Ok(Self {
            config,
            matcher,
            filter,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that stops the run when set.
    ///
    /// Traversal stops dispatching, running scans stop at their next line, and
    /// [`Searcher::run`] returns once they have all finished. The flag is
    /// cleared when that run returns, so the searcher can be run again.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Runs the search, writing every report to `sink`.
    ///
    /// Returns after the tree is exhausted and every dispatched scan has
    /// finished.
    pub fn run<S: MatchSink + ?Sized>(&self, sink: &S) -> SearchResult<SearchSummary> {
        let start = Instant::now();
        let limit = self.config.thread_count;
        info!(
            "Starting search in {} for {:?} ({:?} mode, {} concurrent scans)",
            self.config.root_path.display(),
            self.config.terms,
            self.matcher.mode(),
            limit
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(limit.get())
            .thread_name(|i| format!("wordscout-scan-{}", i))
            .build()
            .map_err(|e| SearchError::config_error(format!("Failed to start scan pool: {}", e)))?;

        let gate = AdmissionGate::new(limit);
        let metrics = ScanMetrics::new();
        let processor = FileProcessor::new(&self.matcher, sink, &metrics, &self.shutdown);
        let walker = Walker::new(
            &self.config,
            &self.filter,
            &gate,
            &processor,
            &metrics,
            &self.shutdown,
        );

        // The scope is the completion barrier: it returns only after every
        // spawned scan has finished.
        pool.in_place_scope(|scope| walker.walk(scope));
        debug!("All scan tasks finished");

        let cancelled = self.shutdown.swap(false, Ordering::SeqCst);
        let summary = metrics.summary(gate.peak(), start.elapsed(), cancelled);
        metrics.log_stats();
        info!(
            "Search complete. Found {} matching lines in {} files",
            summary.lines_matched, summary.files_with_matches
        );

        Ok(summary)
    }
}

/// Runs a search and collects every report in memory
pub fn search(config: &SearchConfig) -> SearchResult<SearchOutput> {
    let searcher = Searcher::new(config.clone())?;
    let sink = CollectingSink::new();
    let summary = searcher.run(&sink)?;

    let mut output = sink.into_output();
    output.summary = summary;
    Ok(output)
}

/// Runs a search, streaming reports to `sink`
pub fn search_with_sink<S: MatchSink + ?Sized>(
    config: &SearchConfig,
    sink: &S,
) -> SearchResult<SearchSummary> {
    Searcher::new(config.clone())?.run(sink)
}

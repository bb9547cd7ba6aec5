use ignore::{DirEntry, WalkBuilder};
use rayon::Scope;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

use super::gate::AdmissionGate;
use super::processor::{FileProcessor, FileTask};
use crate::config::SearchConfig;
use crate::errors::SearchError;
use crate::filters::FileFilter;
use crate::metrics::ScanMetrics;
use crate::sink::MatchSink;

/// Depth-first traversal that hands every regular file to a scan task.
///
/// Traversal runs on the calling thread and never waits for a scan to finish.
/// The only place it blocks is [`AdmissionGate::acquire`], taken before each
/// file is opened; directories are entered without a slot.
pub struct Walker<'a, S: ?Sized> {
    config: &'a SearchConfig,
    filter: &'a FileFilter,
    gate: &'a AdmissionGate,
    processor: &'a FileProcessor<'a, S>,
    metrics: &'a ScanMetrics,
    shutdown: &'a AtomicBool,
}

impl<'a, S: MatchSink + ?Sized> Walker<'a, S> {
    pub fn new(
        config: &'a SearchConfig,
        filter: &'a FileFilter,
        gate: &'a AdmissionGate,
        processor: &'a FileProcessor<'a, S>,
        metrics: &'a ScanMetrics,
        shutdown: &'a AtomicBool,
    ) -> Self {
        Self {
            config,
            filter,
            gate,
            processor,
            metrics,
            shutdown,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Walks the whole tree, spawning scan tasks into `scope`.
    ///
    /// Returns once traversal is done; tasks may still be running; the
    /// caller's scope waits for them.
    pub fn walk<'scope>(&self, scope: &Scope<'scope>)
    where
        'a: 'scope,
    {
        debug!("Scanning directory: {}", self.config.root_path.display());

        // Every entry is visited: no hidden-file or ignore-file filtering.
        // Symlink loops come back as errors instead of endless recursion.
        let walk = WalkBuilder::new(&self.config.root_path)
            .standard_filters(false)
            .follow_links(self.config.follow_links)
            .build();

        for result in walk {
            if self.is_cancelled() {
                debug!("Search cancelled, stopping traversal");
                break;
            }
            match result {
                Ok(entry) => self.visit(scope, entry),
                Err(err) => self.processor.report_error(&SearchError::Traversal(err)),
            }
        }
    }

    fn visit<'scope>(&self, scope: &Scope<'scope>, entry: DirEntry)
    where
        'a: 'scope,
    {
        let Some(file_type) = entry.file_type() else {
            return;
        };

        if file_type.is_dir() {
            trace!("Entering directory: {}", entry.path().display());
            self.metrics.record_directory();
            return;
        }

        if !file_type.is_file() {
            // FIFOs, sockets and devices; opening a FIFO would block
            debug!("Skipping special file: {}", entry.path().display());
            self.metrics.record_skipped();
            return;
        }

        self.metrics.record_discovered();
        if !self.filter.accepts(&self.config.root_path, entry.path()) {
            trace!("Filtered out: {}", entry.path().display());
            self.metrics.record_skipped();
            return;
        }

        self.dispatch(scope, entry.into_path());
    }

    /// Takes a slot, opens the file and spawns its scan
    fn dispatch<'scope>(&self, scope: &Scope<'scope>, path: PathBuf)
    where
        'a: 'scope,
    {
        let permit = self.gate.acquire();
        if self.is_cancelled() {
            return;
        }

        let task = match FileTask::open(path, permit) {
            Ok(task) => task,
            Err(err) => {
                self.processor.report_error(&err);
                return;
            }
        };

        trace!("Dispatching scan: {}", task.path().display());
        let processor = self.processor;
        scope.spawn(move |_| processor.process(task));
    }
}

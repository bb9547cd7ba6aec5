/// Error types for wordscout.
///
/// Errors fall into four groups (see [`ErrorKind`]). Only configuration errors
/// stop a run; they are raised before any directory is read. Traversal, open and
/// scan errors are recovered where they happen: the failing entry is reported on
/// the sink's error channel, counted, and the rest of the tree is still searched.
///
/// ```rust,ignore
/// match Searcher::new(config) {
///     Ok(searcher) => searcher.run(&sink)?,
///     Err(SearchError::EmptySearchTerm { index }) => // reject input,
///     Err(e) => // other configuration problem,
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while configuring or running a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("No search terms provided")]
    NoSearchTerms,
    #[error("Search term #{index} is empty")]
    EmptySearchTerm { index: usize },
    #[error("Invalid thread count {requested}: must be between 1 and {available}")]
    InvalidThreadCount { requested: usize, available: usize },
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidIgnorePattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("Traversal error: {0}")]
    Traversal(#[from] ignore::Error),
    #[error("Cannot open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Read error in {} after line {line_number}: {source}", path.display())]
    Scan {
        path: PathBuf,
        line_number: u64,
        source: std::io::Error,
    },
    #[error("Cannot write match {}:{line_number}: {source}", path.display())]
    Output {
        path: PathBuf,
        line_number: u64,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Coarse classification of a [`SearchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input; fatal, raised before traversal starts
    Configuration,
    /// A directory or entry could not be listed or inspected
    Traversal,
    /// A regular file could not be opened for reading
    FileOpen,
    /// Reading a file, or writing its reports, failed part way through
    Scan,
}

impl SearchError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn empty_search_term(index: usize) -> Self {
        Self::EmptySearchTerm { index }
    }

    pub fn invalid_thread_count(requested: usize, available: usize) -> Self {
        Self::InvalidThreadCount {
            requested,
            available,
        }
    }

    pub fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            source,
        }
    }

    pub fn scan(path: impl Into<PathBuf>, line_number: u64, source: std::io::Error) -> Self {
        Self::Scan {
            path: path.into(),
            line_number,
            source,
        }
    }

    pub fn output(path: impl Into<PathBuf>, line_number: u64, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            line_number,
            source,
        }
    }

    /// Returns which part of the error taxonomy this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::NoSearchTerms
            | SearchError::EmptySearchTerm { .. }
            | SearchError::InvalidThreadCount { .. }
            | SearchError::InvalidIgnorePattern { .. }
            | SearchError::ConfigError(_)
            | SearchError::Settings(_) => ErrorKind::Configuration,
            SearchError::Traversal(_) => ErrorKind::Traversal,
            SearchError::FileOpen { .. } => ErrorKind::FileOpen,
            SearchError::Scan { .. } | SearchError::Output { .. } | SearchError::IoError(_) => {
                ErrorKind::Scan
            }
        }
    }

    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

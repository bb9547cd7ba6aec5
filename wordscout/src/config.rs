use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{SearchError, SearchResult};
use crate::search::matcher::CaseMode;

/// Everything a search needs, fixed before traversal starts.
///
/// A `SearchConfig` is read-only for the whole run and shared by reference
/// with every scan task.
///
/// ```rust,ignore
/// let mut config = SearchConfig::new("src", ["unsafe"]);
/// config.case_mode = CaseMode::Exact;
/// config.validate()?;
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Root directory (or single file) to search
    pub root_path: PathBuf,

    /// Words to look for. Order only affects the order terms are tried in.
    pub terms: Vec<String>,

    /// How tokens are compared with terms
    pub case_mode: CaseMode,

    /// Maximum number of files scanned at the same time
    pub thread_count: NonZeroUsize,

    /// Optional list of file extensions to include (e.g., ["rs", "toml"])
    /// If None, all files are included
    pub file_extensions: Option<Vec<String>>,

    /// Glob patterns, relative to the root, of files to leave out
    pub ignore_patterns: Vec<String>,

    /// Whether symbolic links are followed during traversal
    pub follow_links: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Number of logical CPUs, the upper bound and default for the thread count
pub fn available_threads() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

/// Validates a requested thread count against the range `[1, available]`
pub fn check_thread_count(requested: usize, available: usize) -> SearchResult<NonZeroUsize> {
    match NonZeroUsize::new(requested) {
        Some(count) if requested <= available => Ok(count),
        _ => Err(SearchError::invalid_thread_count(requested, available)),
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl SearchConfig {
    /// Creates a configuration with the default case mode, filters and
    /// thread count
    pub fn new<I, T>(root_path: impl Into<PathBuf>, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            root_path: root_path.into(),
            terms: terms.into_iter().map(Into::into).collect(),
            case_mode: CaseMode::default(),
            thread_count: available_threads(),
            file_extensions: None,
            ignore_patterns: Vec::new(),
            follow_links: true,
            log_level: default_log_level(),
        }
    }

    /// Checks the search terms. Called before any directory is read.
    pub fn validate(&self) -> SearchResult<()> {
        if self.terms.is_empty() {
            return Err(SearchError::NoSearchTerms);
        }
        if let Some(index) = self.terms.iter().position(String::is_empty) {
            return Err(SearchError::empty_search_term(index));
        }
        Ok(())
    }
}

/// Defaults that can be kept in a YAML file.
///
/// # Configuration Locations
///
/// Files are merged in this order, later ones overriding earlier ones:
/// 1. Global `$CONFIG_DIR/wordscout/config.yaml`
/// 2. Local `.wordscout.yaml` in the current directory
/// 3. A file given with `--config`
///
/// # Configuration Format
///
/// ```yaml
/// # Case-sensitive matching
/// exact: false
///
/// # Files scanned at once (default: CPU cores)
/// threads: 4
///
/// # File extensions to include
/// file_extensions: ["rs", "md"]
///
/// # Files to leave out (glob syntax, relative to the root)
/// ignore_patterns: ["target/**"]
///
/// # Follow symbolic links
/// follow_links: true
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub exact: Option<bool>,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub follow_links: Option<bool>,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Settings {
    /// Loads settings from the default locations plus an explicit file.
    ///
    /// The explicit file must exist; the default locations are optional.
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(SearchError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }

        let config_files = [
            dirs::config_dir().map(|p| p.join("wordscout/config.yaml")),
            Some(PathBuf::from(".wordscout.yaml")),
            config_path.map(PathBuf::from),
        ];

        let mut builder = ConfigBuilder::builder();
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges command-line values over file values. Values set on the
    /// command line win.
    pub fn merge_with_cli(mut self, cli: Settings) -> Self {
        if cli.exact.is_some() {
            self.exact = cli.exact;
        }
        if cli.threads.is_some() {
            self.threads = cli.threads;
        }
        if cli.file_extensions.is_some() {
            self.file_extensions = cli.file_extensions;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        if cli.follow_links.is_some() {
            self.follow_links = cli.follow_links;
        }
        if cli.log_level.is_some() {
            self.log_level = cli.log_level;
        }
        self
    }

    /// Log level to use, falling back to `warn`
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }

    /// Builds a validated [`SearchConfig`].
    ///
    /// The thread count must lie in `[1, available]`.
    pub fn into_search_config(
        self,
        root_path: PathBuf,
        terms: Vec<String>,
        available: NonZeroUsize,
    ) -> SearchResult<SearchConfig> {
        let thread_count = match self.threads {
            Some(requested) => check_thread_count(requested, available.get())?,
            None => available,
        };
        let log_level = self.log_level().to_string();

        let config = SearchConfig {
            root_path,
            terms,
            case_mode: CaseMode::from_exact(self.exact.unwrap_or(false)),
            thread_count,
            file_extensions: self.file_extensions,
            ignore_patterns: self.ignore_patterns,
            follow_links: self.follow_links.unwrap_or(true),
            log_level,
        };
        config.validate()?;
        Ok(config)
    }
}

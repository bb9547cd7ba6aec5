pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod results;
pub mod search;
pub mod sink;

pub use config::{SearchConfig, Settings};
pub use errors::{ErrorKind, SearchError, SearchResult};
pub use results::{FileResult, Match, MatchReport, SearchOutput, SearchSummary};
pub use search::{search, search_with_sink, CaseMode, Searcher};
pub use sink::{CollectingSink, MatchSink, WriterSink};

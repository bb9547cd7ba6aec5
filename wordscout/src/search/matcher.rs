use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{SearchError, SearchResult};

/// Bytes that separate words: whitespace, punctuation, brackets and quotes.
const DELIMITER_BYTES: &[u8] = b" \t\r\n.,:?!`()[]-/'\"<>";

/// The delimiter set used for every search
pub static DEFAULT_DELIMITERS: DelimiterSet = DelimiterSet::from_bytes(DELIMITER_BYTES);

/// A fixed set of single-byte word boundaries.
///
/// All delimiters are ASCII, so splitting on them never cuts a UTF-8
/// multi-byte sequence in half.
#[derive(Debug, Clone)]
pub struct DelimiterSet {
    table: [bool; 256],
}

impl DelimiterSet {
    /// Builds a set from a list of delimiter bytes
    pub const fn from_bytes(bytes: &[u8]) -> Self {
        let mut table = [false; 256];
        let mut i = 0;
        while i < bytes.len() {
            table[bytes[i] as usize] = true;
            i += 1;
        }
        Self { table }
    }

    /// Returns true if `byte` is a word boundary
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.table[byte as usize]
    }
}

impl Default for DelimiterSet {
    fn default() -> Self {
        DEFAULT_DELIMITERS.clone()
    }
}

/// Splits a line into its words, left to right.
///
/// Consecutive delimiters never produce empty tokens, so an empty line or a
/// line made only of delimiters yields nothing.
pub fn tokenize<'a>(
    line: &'a [u8],
    delimiters: &'a DelimiterSet,
) -> impl Iterator<Item = &'a [u8]> + 'a {
    line.split(move |&b| delimiters.contains(b))
        .filter(|token| !token.is_empty())
}

/// How tokens are compared with search terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// ASCII case-insensitive equality. Bytes outside ASCII are compared
    /// exactly, so `É` and `é` are different words.
    #[default]
    Insensitive,
    /// Byte-for-byte equality
    Exact,
}

type Comparator = fn(&[u8], &[u8]) -> bool;

impl CaseMode {
    /// Maps the command line's "exact match" switch to a mode
    pub fn from_exact(exact: bool) -> Self {
        if exact {
            CaseMode::Exact
        } else {
            CaseMode::Insensitive
        }
    }

    fn comparator(self) -> Comparator {
        match self {
            CaseMode::Exact => |token: &[u8], term: &[u8]| token == term,
            CaseMode::Insensitive => |token: &[u8], term: &[u8]| token.eq_ignore_ascii_case(term),
        }
    }
}

/// Decides whether a line contains one of the search terms as a whole word
#[derive(Debug, Clone)]
pub struct WordMatcher {
    terms: Vec<Box<[u8]>>,
    mode: CaseMode,
    compare: Comparator,
    delimiters: &'static DelimiterSet,
}

impl WordMatcher {
    /// Creates a matcher for the given terms.
    ///
    /// Fails when no terms are given or when any term is empty.
    pub fn new<I, T>(terms: I, mode: CaseMode) -> SearchResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut compiled: Vec<Box<[u8]>> = Vec::new();
        for (index, term) in terms.into_iter().enumerate() {
            let term = term.as_ref();
            if term.is_empty() {
                return Err(SearchError::empty_search_term(index));
            }
            if term.bytes().any(|b| DEFAULT_DELIMITERS.contains(b)) {
                warn!(
                    "Search term '{}' contains a word delimiter and can never match",
                    term
                );
            }
            compiled.push(term.as_bytes().into());
        }

        if compiled.is_empty() {
            return Err(SearchError::NoSearchTerms);
        }

        Ok(Self {
            terms: compiled,
            mode,
            compare: mode.comparator(),
            delimiters: &DEFAULT_DELIMITERS,
        })
    }

    pub fn mode(&self) -> CaseMode {
        self.mode
    }

    /// Returns true if `token` equals any search term under the matcher's mode
    #[inline]
    pub fn matches_token(&self, token: &[u8]) -> bool {
        self.terms.iter().any(|term| (self.compare)(token, term))
    }

    /// Returns true if any word of `line` is a search term.
    ///
    /// The answer is per line: a line with several hits is still one match.
    pub fn is_match(&self, line: &[u8]) -> bool {
        tokenize(line, self.delimiters).any(|token| self.matches_token(token))
    }
}

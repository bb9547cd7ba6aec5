/// Bounded concurrent whole-word search.
///
/// A search is split in two parts:
///
/// 1. **Matching** ([`matcher`]): a line is cut into words on a fixed
///    [`DelimiterSet`](matcher::DelimiterSet) and each word is compared with the
///    search terms, exactly or ignoring ASCII case. A line matches at most once.
/// 2. **Walking** ([`walker`], [`gate`], [`processor`], [`engine`]): the tree
///    under the root is traversed depth-first on the calling thread. Each
///    regular file takes a slot from the [`AdmissionGate`](gate::AdmissionGate),
///    is opened, and is scanned on a worker pool while traversal moves on.
///
/// ```text
/// walker (caller thread)           scan pool (N threads)
/// ──────────────────────           ─────────────────────
/// dir  → recurse, no slot
/// file → gate.acquire()  ──spawn──▶ read lines → match → sink.report()
/// file → gate.acquire()  ──spawn──▶ ...
///        (blocks while N scans     drop(task) releases handle and slot
///         hold slots)
/// end of tree → scope waits for every spawned scan
/// ```
///
/// The gate bounds how many files are open and scanned at once, and the rayon
/// scope guarantees that [`search`] only returns after every scan finished.
pub mod engine;
pub mod gate;
pub mod matcher;
pub mod processor;
pub mod walker;

pub use engine::{search, search_with_sink, Searcher};
pub use gate::{AdmissionGate, ScanPermit};
pub use matcher::{tokenize, CaseMode, DelimiterSet, WordMatcher, DEFAULT_DELIMITERS};
pub use processor::{scan_lines, FileProcessor, FileTask, ScanOutcome};
pub use walker::Walker;

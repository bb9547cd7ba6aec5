/// Optional file filtering.
///
/// By default every regular file is searched. A search can narrow that down
/// with an extension allow-list and with glob ignore patterns, both checked
/// against the path relative to the search root.
use glob::Pattern;
use std::path::Path;

use crate::errors::{SearchError, SearchResult};

/// Checks if a file should be included in the search based on its extension
pub fn has_valid_extension(path: &Path, extensions: &Option<Vec<String>>) -> bool {
    match extensions {
        None => true,
        Some(exts) => path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                exts.iter()
                    .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
            }),
    }
}

/// Compiles ignore patterns, rejecting the first invalid one
pub fn compile_patterns(patterns: &[String]) -> SearchResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| SearchError::InvalidIgnorePattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Checks if a path matches any of the ignore patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[Pattern]) -> bool {
    if ignore_patterns.is_empty() {
        return false;
    }
    let normalized_path = path.to_string_lossy().replace('\\', "/");
    ignore_patterns.iter().any(|p| p.matches(&normalized_path))
}

/// Decides which discovered files get scanned
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    extensions: Option<Vec<String>>,
    ignore_patterns: Vec<Pattern>,
}

impl FileFilter {
    pub fn new(extensions: Option<Vec<String>>, ignore_patterns: &[String]) -> SearchResult<Self> {
        Ok(Self {
            extensions,
            ignore_patterns: compile_patterns(ignore_patterns)?,
        })
    }

    /// Returns true when the file at `path`, found under `root`, should be scanned
    pub fn accepts(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        has_valid_extension(path, &self.extensions) && !should_ignore(relative, &self.ignore_patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_valid_extension() {
        let path = Path::new("test.rs");
        let extensions = Some(vec!["rs".to_string()]);
        assert!(has_valid_extension(path, &extensions));

        let path = Path::new("test.py");
        assert!(!has_valid_extension(path, &extensions));

        let path = Path::new("test.RS");
        assert!(has_valid_extension(path, &extensions));

        let path = Path::new("test");
        assert!(!has_valid_extension(path, &extensions));

        let dotted = Some(vec![".txt".to_string()]);
        assert!(has_valid_extension(Path::new("notes.txt"), &dotted));

        let path = Path::new("test.rs");
        let no_extensions = None;
        assert!(has_valid_extension(path, &no_extensions));
    }

    #[test]
    fn test_should_ignore() {
        let ignore_patterns = compile_patterns(&[
            "**/test_[0-4].txt".to_string(),
            "target/**/*.rs".to_string(),
            ".git/*".to_string(),
            "**/*.tmp".to_string(),
        ])
        .unwrap();

        assert!(should_ignore(Path::new("test_0.txt"), &ignore_patterns));
        assert!(should_ignore(Path::new("dir/test_2.txt"), &ignore_patterns));
        assert!(should_ignore(
            Path::new("target/debug/main.rs"),
            &ignore_patterns
        ));
        assert!(should_ignore(Path::new(".git/config"), &ignore_patterns));
        assert!(should_ignore(Path::new("src/temp.tmp"), &ignore_patterns));

        assert!(!should_ignore(Path::new("test_5.txt"), &ignore_patterns));
        assert!(!should_ignore(Path::new("src/main.rs"), &ignore_patterns));
        assert!(!should_ignore(Path::new(".git2/config"), &ignore_patterns));
        assert!(!should_ignore(Path::new("anything"), &[]));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = compile_patterns(&["[unclosed".to_string()]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidIgnorePattern { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_file_filter_uses_relative_paths() {
        let filter = FileFilter::new(
            Some(vec!["txt".to_string()]),
            &["skip/**".to_string()],
        )
        .unwrap();
        let root = Path::new("/data/root");

        assert!(filter.accepts(root, Path::new("/data/root/a.txt")));
        assert!(!filter.accepts(root, Path::new("/data/root/a.rs")));
        assert!(!filter.accepts(root, Path::new("/data/root/skip/b.txt")));
        assert!(filter.accepts(root, Path::new("/data/root/keep/b.txt")));

        let default = FileFilter::default();
        assert!(default.accepts(root, Path::new("/data/root/anything.bin")));
    }
}

//! Path filtering for archive enumeration
//!
//! A `PathFilter` holds two substring pattern sets: allow (highest priority)
//! and deny. Patterns are plain substrings, no glob or regex semantics.
//! Directories are evaluated with a trailing `/` appended so a pattern like
//! `build/` can match directories without matching a file named `build`.

use std::collections::BTreeSet;
use std::path::Path;

/// Patterns denied by default: cache directories, IDE folders, and
/// already-built zip artifacts.
pub const DEFAULT_DENYLIST: &[&str] = &["__pycache__", ".vscode", ".zip"];

/// Immutable allow/deny substring filter
///
/// The sets are fixed at construction; nothing mutates them mid-walk.
#[derive(Debug, Clone)]
pub struct PathFilter {
    /// Allow patterns; a match here always wins
    allow: BTreeSet<String>,
    /// Deny patterns; consulted only when no allow pattern matches
    deny: BTreeSet<String>,
}

impl PathFilter {
    /// Build a filter from explicit allow and deny sets
    pub fn new(
        allow: impl IntoIterator<Item = String>,
        deny: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            allow: allow.into_iter().collect(),
            deny: deny.into_iter().collect(),
        }
    }

    /// The built-in denylist with no allow patterns
    pub fn with_default_denylist() -> Self {
        Self::new(
            std::iter::empty(),
            DEFAULT_DENYLIST.iter().map(|s| s.to_string()),
        )
    }

    /// Allow patterns in sorted order
    pub fn allowlist(&self) -> impl Iterator<Item = &str> {
        self.allow.iter().map(String::as_str)
    }

    /// Deny patterns in sorted order
    pub fn denylist(&self) -> impl Iterator<Item = &str> {
        self.deny.iter().map(String::as_str)
    }

    /// Evaluate a candidate string against both pattern sets
    ///
    /// Returns true if any allow pattern is contained in `text`; otherwise
    /// true only if no deny pattern is contained in it.
    pub fn matches(&self, text: &str) -> bool {
        if self.allow.iter().any(|pattern| text.contains(pattern)) {
            return true;
        }
        !self.deny.iter().any(|pattern| text.contains(pattern))
    }

    /// Evaluate a filesystem path, appending `/` when it is a directory
    pub fn is_valid(&self, path: &Path, is_dir: bool) -> bool {
        let text = path.to_string_lossy();
        if is_dir {
            self.matches(&format!("{}/", text))
        } else {
            self.matches(&text)
        }
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::with_default_denylist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn filter(allow: &[&str], deny: &[&str]) -> PathFilter {
        PathFilter::new(
            allow.iter().map(|s| s.to_string()),
            deny.iter().map(|s| s.to_string()),
        )
    }

    #[test]
    fn test_no_patterns_allows_everything() {
        let f = filter(&[], &[]);
        assert!(f.matches("/home/user/project/src/main.rs"));
    }

    #[test]
    fn test_deny_substring() {
        let f = filter(&[], &["node_modules"]);
        assert!(!f.matches("/app/node_modules/left-pad/index.js"));
        assert!(f.matches("/app/src/index.js"));
    }

    #[test]
    fn test_allow_overrides_deny() {
        // The same path matches both sets; allow must win
        let f = filter(&["node_modules/keep"], &["node_modules"]);
        assert!(f.matches("/app/node_modules/keep/data.bin"));
        assert!(!f.matches("/app/node_modules/other/data.bin"));
    }

    #[test]
    fn test_allow_wins_regardless_of_deny_content() {
        let f = filter(&["x"], &["x", "y", "z"]);
        assert!(f.matches("x"));
        assert!(f.matches("axb"));
    }

    #[test]
    fn test_directory_trailing_separator() {
        let f = filter(&[], &["build/"]);
        assert!(!f.is_valid(&PathBuf::from("/proj/build"), true));
        // A plain file named "build" does not get the separator
        assert!(f.is_valid(&PathBuf::from("/proj/build"), false));
    }

    #[test]
    fn test_default_denylist() {
        let f = PathFilter::with_default_denylist();
        assert!(!f.is_valid(&PathBuf::from("/proj/__pycache__"), true));
        assert!(!f.is_valid(&PathBuf::from("/proj/.vscode"), true));
        assert!(!f.is_valid(&PathBuf::from("/proj/old-backup.zip"), false));
        assert!(f.is_valid(&PathBuf::from("/proj/src"), true));
    }

    #[test]
    fn test_lists_iterate_sorted() {
        let f = filter(&["b", "a"], &["z", "m"]);
        assert_eq!(f.allowlist().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(f.denylist().collect::<Vec<_>>(), vec!["m", "z"]);
    }
}

//! Deterministic tree enumeration
//!
//! `TreeWalker` lazily walks a target file or directory, yielding one entry
//! per archive member. Member order is a public contract: each directory is
//! yielded before its contents, then its files sorted by name, then its
//! subdirectories sorted by name, depth-first. Re-running on an unchanged
//! tree yields byte-identical member ordering.
//!
//! Filtering prunes whole subtrees: once a directory fails the filter,
//! nothing under it is visited, regardless of rules that would have matched
//! its descendants.

use std::fs;
use std::path::{Path, PathBuf};

use crate::backup::filter::PathFilter;
use crate::error::{ZipkeepError, ZipkeepResult};

/// One enumerated archive member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute source path on disk
    pub source: PathBuf,
    /// Forward-slash archive-relative name; directories end in `/`
    pub arcname: String,
    /// Whether this entry is a directory member
    pub is_dir: bool,
}

/// A node waiting to be visited
#[derive(Debug)]
struct Node {
    source: PathBuf,
    /// Relative name without any trailing separator
    rel: String,
    is_dir: bool,
}

/// Lazy, depth-first enumerator over a target tree
///
/// Yields `Err` and stops making progress on filesystem failures; the caller
/// decides whether to abort. Re-invocation walks the filesystem again, no
/// state is cached between walks.
#[derive(Debug)]
pub struct TreeWalker<'a> {
    filter: &'a PathFilter,
    stack: Vec<Node>,
}

impl<'a> TreeWalker<'a> {
    /// Start a walk rooted at `target`
    ///
    /// The archive-relative root component is the target's base name, never
    /// its absolute path.
    pub fn new(target: &Path, filter: &'a PathFilter) -> ZipkeepResult<Self> {
        if !target.exists() {
            return Err(ZipkeepError::TargetNotFound(
                target.to_string_lossy().to_string(),
            ));
        }

        let rel = target
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                ZipkeepError::TargetNotFound(target.to_string_lossy().to_string())
            })?;

        Ok(Self {
            filter,
            stack: vec![Node {
                source: target.to_path_buf(),
                rel,
                is_dir: target.is_dir(),
            }],
        })
    }

    /// Queue the children of a directory node, files first
    ///
    /// The stack is LIFO, so subdirectories are pushed before files and both
    /// groups are pushed in reverse name order.
    fn push_children(&mut self, node: &Node) -> ZipkeepResult<()> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for entry in fs::read_dir(&node.source)
            .map_err(|e| ZipkeepError::Io(format!("Failed to read {}: {}", node.source.display(), e)))?
        {
            let entry = entry
                .map_err(|e| ZipkeepError::Io(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            } else {
                files.push(path);
            }
        }

        files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
        dirs.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

        for path in dirs.into_iter().rev().chain(files.into_iter().rev()) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            self.stack.push(Node {
                rel: format!("{}/{}", node.rel, name),
                is_dir: path.is_dir(),
                source: path,
            });
        }

        Ok(())
    }
}

impl Iterator for TreeWalker<'_> {
    type Item = ZipkeepResult<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.stack.pop()?;

            if !self.filter.is_valid(&node.source, node.is_dir) {
                // Pruned: descendants are never queued
                continue;
            }

            if node.is_dir {
                if let Err(e) = self.push_children(&node) {
                    return Some(Err(e));
                }
                return Some(Ok(WalkEntry {
                    arcname: format!("{}/", node.rel),
                    source: node.source,
                    is_dir: true,
                }));
            }

            return Some(Ok(WalkEntry {
                arcname: node.rel,
                source: node.source,
                is_dir: false,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn arcnames(target: &Path, filter: &PathFilter) -> Vec<String> {
        TreeWalker::new(target, filter)
            .unwrap()
            .map(|entry| entry.unwrap().arcname)
            .collect()
    }

    #[test]
    fn test_single_file_target() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "notes.txt", "hello");

        let filter = PathFilter::default();
        let names = arcnames(&temp_dir.path().join("notes.txt"), &filter);
        assert_eq!(names, vec!["notes.txt"]);
    }

    #[test]
    fn test_files_before_directories_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("proj");
        write(&root, "zeta.txt", "z");
        write(&root, "alpha.txt", "a");
        write(&root, "bdir/inner.txt", "i");
        write(&root, "adir/inner.txt", "i");

        let filter = PathFilter::default();
        let names = arcnames(&root, &filter);
        assert_eq!(
            names,
            vec![
                "proj/",
                "proj/alpha.txt",
                "proj/zeta.txt",
                "proj/adir/",
                "proj/adir/inner.txt",
                "proj/bdir/",
                "proj/bdir/inner.txt",
            ]
        );
    }

    #[test]
    fn test_order_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("proj");
        for name in ["c.txt", "a.txt", "b.txt"] {
            write(&root, name, name);
        }
        write(&root, "sub/d.txt", "d");

        let filter = PathFilter::default();
        let first = arcnames(&root, &filter);
        let second = arcnames(&root, &filter);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_directory_is_representable() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("proj");
        fs::create_dir_all(root.join("empty")).unwrap();

        let filter = PathFilter::default();
        let names = arcnames(&root, &filter);
        assert_eq!(names, vec!["proj/", "proj/empty/"]);
    }

    #[test]
    fn test_pruning_is_transitive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("proj");
        write(&root, "src/main.rs", "fn main() {}");
        write(&root, "skip/keep-me/data.txt", "x");

        // "keep-me" would match an allow rule, but its parent is pruned
        // before the rule is ever evaluated
        let filter = PathFilter::new(
            vec!["keep-me".to_string()],
            vec!["skip/".to_string()],
        );
        let names = arcnames(&root, &filter);
        assert_eq!(names, vec!["proj/", "proj/src/", "proj/src/main.rs"]);
    }

    #[test]
    fn test_denied_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("proj");
        write(&root, "keep.txt", "k");
        write(&root, "old.zip", "z");

        let filter = PathFilter::default();
        let names = arcnames(&root, &filter);
        assert_eq!(names, vec!["proj/", "proj/keep.txt"]);
    }

    #[test]
    fn test_missing_target() {
        let temp_dir = TempDir::new().unwrap();
        let filter = PathFilter::default();
        let err = TreeWalker::new(&temp_dir.path().join("nope"), &filter).unwrap_err();
        assert!(err.is_target_not_found());
    }

    #[test]
    fn test_arcnames_are_relative() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("proj");
        write(&root, "a.txt", "a");

        let filter = PathFilter::default();
        for name in arcnames(&root, &filter) {
            assert!(!name.starts_with('/'));
            assert!(name.starts_with("proj"));
        }
    }
}

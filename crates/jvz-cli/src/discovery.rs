//! Finding `.java` files under the source roots.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

pub fn build_excludes(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("invalid exclude pattern '{pattern}'"))?;
        builder.add(glob);
    }
    builder.build().context("failed to compile exclude patterns")
}

/// Every `.java` file under `roots`, in root order and then path order.
///
/// Hidden files and directories are skipped. A file is excluded when a glob
/// matches its path relative to its root or the path as given.
pub fn discover_sources(roots: &[PathBuf], excludes: &GlobSet) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for root in roots {
        if !root.is_dir() {
            warn!(root = %root.display(), "source root is not a directory");
            continue;
        }
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "java") {
                continue;
            }
            if is_excluded(path, root, excludes) {
                debug!(path = %path.display(), "excluded");
                continue;
            }
            files.push(path.to_path_buf());
        }
    }
    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn is_excluded(path: &Path, root: &Path, excludes: &GlobSet) -> bool {
    if excludes.is_empty() {
        return false;
    }
    excludes.is_match(path) || path.strip_prefix(root).is_ok_and(|relative| excludes.is_match(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "class X {}").unwrap();
    }

    #[test]
    fn test_scan_skips_hidden_and_non_java_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("src");
        touch(&root.join("b/B.java"));
        touch(&root.join("a/A.java"));
        touch(&root.join("a/notes.txt"));
        touch(&root.join(".git/Hidden.java"));
        touch(&root.join("a/.Secret.java"));

        let found = discover_sources(&[root.clone()], &GlobSet::empty());
        assert_eq!(found, vec![root.join("a/A.java"), root.join("b/B.java")]);
    }

    #[test]
    fn test_excludes_match_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("src");
        touch(&root.join("app/Main.java"));
        touch(&root.join("app/generated/R.java"));

        let excludes = build_excludes(&["**/generated/**".to_string()]).unwrap();
        let found = discover_sources(&[root.clone()], &excludes);
        assert_eq!(found, vec![root.join("app/Main.java")]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_sources(&[dir.path().join("nope")], &GlobSet::empty()).is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(build_excludes(&["a[".to_string()]).is_err());
    }
}

//! File set for collecting Rust source files to consider for mutation.

use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;

use super::Result;
use crate::config::Config;

/// A set of `.rs` files under a root, respecting `.gitignore` and the
/// harness's configured exclude patterns.
#[derive(Debug, Clone)]
pub struct FileSet {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl FileSet {
    /// Collect a file set from a directory path using the given config's
    /// exclude patterns.
    pub fn from_path(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        Self::from_path_with_patterns(path, &config.exclude_patterns)
    }

    /// Collect a file set from a directory path with no exclusions.
    pub fn from_path_default(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_path_with_patterns(path, &[])
    }

    /// Collect a file set with custom exclude glob patterns.
    pub fn from_path_with_patterns(
        path: impl AsRef<Path>,
        exclude_patterns: &[String],
    ) -> Result<Self> {
        let root = path.as_ref().canonicalize()?;

        let mut overrides = OverrideBuilder::new(&root);
        for pattern in exclude_patterns {
            overrides
                .add(&format!("!{pattern}"))
                .map_err(|e| super::Error::Config(e.to_string()))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| super::Error::Config(e.to_string()))?;

        let walker = WalkBuilder::new(&root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .overrides(overrides)
            .build();

        let mut files: Vec<PathBuf> = walker
            .flatten()
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("rs"))
            .collect();

        files.sort();

        Ok(Self { root, files })
    }

    /// The canonicalized root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All discovered files, sorted for deterministic traversal order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    /// Path relative to the file set's root, for display names.
    pub fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

impl IntoIterator for FileSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_set_empty() {
        let temp = tempfile::tempdir().unwrap();
        let file_set = FileSet::from_path_default(temp.path()).unwrap();
        assert!(file_set.is_empty());
    }

    #[test]
    fn test_file_set_filters_to_rust() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("main.go"), "package main").unwrap();
        std::fs::write(temp.path().join("lib.rs"), "fn main() {}").unwrap();
        std::fs::write(temp.path().join("README.md"), "# README").unwrap();

        let file_set = FileSet::from_path_default(temp.path()).unwrap();
        assert_eq!(file_set.len(), 1);
        assert_eq!(file_set.files()[0].file_name().unwrap(), "lib.rs");
    }

    #[test]
    fn test_file_set_respects_exclude_patterns() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("lib.rs"), "fn main() {}").unwrap();
        std::fs::write(temp.path().join("generated.rs"), "fn gen() {}").unwrap();

        let file_set = FileSet::from_path_with_patterns(
            temp.path(),
            &["generated.rs".to_string()],
        )
        .unwrap();
        assert_eq!(file_set.len(), 1);
        assert_eq!(file_set.files()[0].file_name().unwrap(), "lib.rs");
    }
}

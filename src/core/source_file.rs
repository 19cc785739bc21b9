//! Source file representation for the IR transformer.

use std::path::{Path, PathBuf};

use super::Result;

/// A Rust source file with its content loaded, ready for parsing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    /// Load a source file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    pub fn from_content(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Parse as a `syn::File`, the unit the IR transformer walks.
    pub fn parse(&self) -> Result<syn::File> {
        syn::parse_file(&self.content).map_err(|e| super::Error::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    pub fn total_lines(&self) -> usize {
        self.content.lines().count()
    }
}

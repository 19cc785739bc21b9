//! Core types shared across the mutation engine.

mod error;
mod file_set;
mod source_file;

pub use error::{Error, Result};
pub use file_set::FileSet;
pub use source_file::SourceFile;

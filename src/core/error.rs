//! Error types for the mutflow library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using mutflow's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mutation transformation, session
/// management, or execution.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading source or pragma files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The source file could not be parsed as Rust.
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Malformed harness configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A session/registry protocol violation: double acquisition, a
    /// negative run index, `endRun`/`closeSession` with no open session.
    #[error("Registry error: {0}")]
    Registry(String),

    /// A trap string did not resolve to exactly one discovered point.
    #[error("Unresolved trap: {0}")]
    UnresolvedTrap(String),

    /// Serialization error (session state, summary).
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Figment configuration-layering error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A mutation survived a run that should have killed it.
    #[error("Mutation survived: {display_name}")]
    MutationSurvived { display_name: String },

    /// A mutation run exceeded its configured timeout.
    #[error("Mutation run timed out: {display_name} ({hint})")]
    MutationTimedOut { display_name: String, hint: String },
}

impl Error {
    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new registry-protocol error.
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }

    /// Create a new unresolved-trap error.
    pub fn unresolved_trap(message: impl Into<String>) -> Self {
        Self::UnresolvedTrap(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("bad selection strategy");
        assert_eq!(err.to_string(), "Configuration error: bad selection strategy");

        let err = Error::FileNotFound {
            path: PathBuf::from("src/lib.rs"),
        };
        assert_eq!(err.to_string(), "File not found: src/lib.rs");
    }

    #[test]
    fn test_mutation_survived_display() {
        let err = Error::MutationSurvived {
            display_name: "Calc.kt:8".into(),
        };
        assert_eq!(err.to_string(), "Mutation survived: Calc.kt:8");
    }
}

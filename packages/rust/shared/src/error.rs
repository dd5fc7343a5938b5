//! Error types for Threatwire.
//!
//! Library crates use [`ThreatwireError`] via `thiserror`.
//! The app crate (cli) wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Threatwire operations.
#[derive(Debug, thiserror::Error)]
pub enum ThreatwireError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error: transport failure or a failed status check on any
    /// outbound call (signal sources, completion endpoint, webhook).
    #[error("network error: {0}")]
    Network(String),

    /// Enrichment response parsing error (the model's output is not valid
    /// JSON or does not match the expected shape).
    #[error("enrichment error: {0}")]
    Enrichment(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ThreatwireError>;

impl ThreatwireError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a network error from any displayable message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an enrichment error from any displayable message.
    pub fn enrichment(msg: impl Into<String>) -> Self {
        Self::Enrichment(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

//! Error types for leadloom.
//!
//! Library crates use [`LeadLoomError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all leadloom operations.
#[derive(Debug, thiserror::Error)]
pub enum LeadLoomError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to an enrichment collaborator.
    #[error("network error: {0}")]
    Network(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Uniqueness conflict in the lead store (duplicate identity or live
    /// email). The reconciler catches this and retries as an update.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Enrichment collaborator returned an unusable response.
    #[error("enrichment error: {0}")]
    Enrichment(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed record, invalid field, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LeadLoomError>;

impl LeadLoomError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a storage uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LeadLoomError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = LeadLoomError::validation("external_id must not be empty");
        assert!(err.to_string().contains("external_id"));
    }

    #[test]
    fn conflict_detection() {
        let err = LeadLoomError::Conflict("UNIQUE constraint failed: leads.email".into());
        assert!(err.is_conflict());
        assert!(!LeadLoomError::Network("timeout".into()).is_conflict());
    }
}

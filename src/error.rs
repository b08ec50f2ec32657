//! Error types for jotbook

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for jotbook
#[derive(Debug, Error)]
pub enum JotbookError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("Corrupt store: {0}")]
    Corrupt(String),

    #[error("Image encoding failed: {0}")]
    ImageEncoding(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Not a jotbook directory: {0}")]
    NotAJotbookDirectory(PathBuf),

    #[error("Store is locked by another process: {0}")]
    StoreLocked(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl JotbookError {
    pub fn journal_not_found(id: impl ToString) -> Self {
        JotbookError::NotFound {
            kind: "Journal",
            id: id.to_string(),
        }
    }

    pub fn entry_not_found(id: impl ToString) -> Self {
        JotbookError::NotFound {
            kind: "Entry",
            id: id.to_string(),
        }
    }

    /// Whether retrying the failed operation could succeed without caller changes
    pub fn is_retryable(&self) -> bool {
        matches!(self, JotbookError::Io(_) | JotbookError::Commit(_))
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            JotbookError::NotAJotbookDirectory(path) => {
                format!(
                    "Not a jotbook directory: {}\n\n\
                    Suggestions:\n\
                    • Initialize the directory before opening it\n\
                    • Check that the path points at the journal root, not at .jotbook",
                    path.display()
                )
            }
            JotbookError::StoreLocked(path) => {
                format!(
                    "The journal at {} is open in another process.\n\n\
                    Suggestions:\n\
                    • Close the other application and try again\n\
                    • Remove a stale .jotbook/lock only if no other process is running",
                    path.display()
                )
            }
            JotbookError::Commit(_) | JotbookError::Io(_) => {
                format!(
                    "{}\n\n\
                    Your changes are still pending.\n\
                    Suggestions:\n\
                    • Check free disk space and permissions, then save again\n\
                    • Discard the pending changes to return to the last saved state",
                    self
                )
            }
            JotbookError::InvalidColor(value) => {
                format!(
                    "Invalid color: '{}'\n\n\
                    Expected six hex digits in RRGGBB order, optionally prefixed with '#'\n\
                    Example: 007AFF",
                    value
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using JotbookError
pub type Result<T> = std::result::Result<T, JotbookError>;

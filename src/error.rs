//! Error types for the item store and reconciler.

use thiserror::Error;

/// Main error type for snapshot, diff, and apply operations.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Duplicate item identity in snapshot: {0}")]
    DuplicateItem(String),

    #[error("Duplicate section identity in snapshot: {0}")]
    DuplicateSection(String),

    #[error("Stale apply: {0}")]
    StaleApply(String),

    #[error("Seed error: {0}")]
    Seed(String),
}

impl From<serde_json::Error> for DiffError {
    fn from(e: serde_json::Error) -> Self {
        DiffError::Seed(e.to_string())
    }
}

/// Result type for reconciler operations.
pub type Result<T> = std::result::Result<T, DiffError>;

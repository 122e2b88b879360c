//! Error taxonomy for schema and lifecycle operations

use crate::schema::Violation;
use thiserror::Error;

/// Errors surfaced by schema mutations, lifecycle transitions and the store
#[derive(Debug, Error)]
pub enum FormError {
    /// A schema invariant would be violated; nothing was written
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<Violation>),

    /// Attempted to delete a built-in section or field
    #[error("permission denied: {0}")]
    Permission(String),

    /// The operation is not allowed in the current lifecycle state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The operation needs history that does not exist (e.g. no rollback snapshot)
    #[error("not available: {0}")]
    NotAvailable(String),

    /// No configuration, section or field with the given key
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FormError {
    /// Violations carried by a validation failure (empty for other kinds)
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation(violations) => violations,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, FormError>;

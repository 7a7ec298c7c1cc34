//! Error types for blobreap
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur during a cleanup run
#[derive(Debug, Error)]
pub enum ReapError {
    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// A table or column name is not a plain SQL identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The reference database could not be opened or closed
    #[error("Reference source error: {0}")]
    ReferenceSource(String),

    /// Querying one registered column failed
    #[error("Failed to read references from {table}.{column}: {reason}")]
    ReferenceQuery {
        table: String,
        column: String,
        reason: String,
    },

    /// Listing the blob store failed
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// A blob name would address something outside the store root
    #[error("Invalid blob name: {0:?}")]
    InvalidBlobName(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for blobreap operations
pub type Result<T> = std::result::Result<T, ReapError>;

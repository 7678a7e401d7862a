//! Common error types for Nanhai

use thiserror::Error;

/// Common result type for Nanhai operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Nanhai crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be encoded or decoded
    #[error("Document encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A competing write replaced the document after it was loaded
    #[error("Document version conflict (expected version {expected})")]
    Conflict { expected: i64 },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (broken invariant)
    #[error("Internal error: {0}")]
    Internal(String),
}

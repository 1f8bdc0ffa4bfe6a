//! Error types for flint

use thiserror::Error;

/// Core error type for flint operations
#[derive(Error, Debug)]
pub enum FlintError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Operation \"{0}\" not allowed on a disconnected database")]
    NotConnected(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Canceled")]
    Canceled,

    #[error("{0}")]
    Other(String),
}

impl FlintError {
    /// Check if this error is the cancellation signal
    pub fn is_canceled(&self) -> bool {
        matches!(self, FlintError::Canceled)
    }

    /// Check if this error is an object-not-found condition
    pub fn is_object_not_found(&self) -> bool {
        matches!(self, FlintError::ObjectNotFound(_))
    }
}

/// Result type alias for flint operations
pub type Result<T> = std::result::Result<T, FlintError>;

//! Error types for the retail sales pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the retail sales pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing input directory or file.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input file could not be parsed as tabular data.
    #[error("Format error: {0}")]
    Format(String),

    /// A row survived cleaning but still violates the clean-table invariant.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    /// Create a data integrity error.
    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Error::DataIntegrity(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

//! Error types for book upload operations

use thiserror::Error;

/// Result type for book upload operations
pub type BookUploadsResult<T> = Result<T, BookUploadsError>;

/// Errors that can occur while issuing upload URLs
#[derive(Error, Debug)]
pub enum BookUploadsError {
    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Presigning configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

//! Error types for memory blocks and their collaborators.

use thiserror::Error;

/// Boxed error carried across capability boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Memory block error types
#[derive(Error, Debug)]
pub enum MemoryError {
    /// A summarizer, extractor or condenser call failed.
    ///
    /// The original error is kept as the source so callers can downcast it.
    #[error("External service error: {0}")]
    Service(#[source] BoxError),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MemoryError {
    /// Wrap any error as an external service failure.
    pub fn service(err: impl Into<BoxError>) -> Self {
        Self::Service(err.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias for memory operations
pub type Result<T> = std::result::Result<T, MemoryError>;

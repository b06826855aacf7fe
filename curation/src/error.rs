//! Error types for the curation system.

use thiserror::Error;

/// Result type alias for curation operations.
pub type Result<T> = std::result::Result<T, CurationError>;

/// Errors that can occur while clustering or promoting uncertain cases.
#[derive(Error, Debug)]
pub enum CurationError {
    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] helpdesk_embeddings::EmbeddingError),

    /// Retrieval error.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] helpdesk_retrieval::RetrievalError),

    /// Caller bug, not a runtime condition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

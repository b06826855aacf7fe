//! Error types for the retrieval stack.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur while maintaining or querying the knowledge base.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] helpdesk_embeddings::EmbeddingError),

    /// Caller bug, not a runtime condition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The entry list and embedding matrix no longer line up. Fatal for
    /// this index instance; rebuilding from the entry texts is the only
    /// recovery path.
    #[error("corrupt index: {entries} entries vs {embeddings} embeddings")]
    CorruptIndex { entries: usize, embeddings: usize },

    /// The embedding provider exceeded the configured deadline.
    #[error("embedding provider timed out after {timeout_secs}s")]
    ProviderTimeout { timeout_secs: u64 },

    /// No embedding provider was supplied.
    #[error("no embedding provider configured")]
    ProviderMissing,
}

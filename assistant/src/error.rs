//! Error types for the assistant pipeline.

use thiserror::Error;

/// Result type alias for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Errors that can occur in the assistant pipeline.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Retrieval error.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] helpdesk_retrieval::RetrievalError),

    /// Curation error.
    #[error("curation error: {0}")]
    Curation(#[from] helpdesk_curation::CurationError),

    /// Responder not configured.
    #[error("responder not configured")]
    ResponderNotConfigured,

    /// No retrieval orchestrator was supplied.
    #[error("orchestrator not configured")]
    OrchestratorNotConfigured,

    /// Generation request failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Invalid response from the completion API.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

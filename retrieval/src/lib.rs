//! # Retrieval
//!
//! This crate maintains the helpdesk knowledge base and answers similarity
//! queries over it.
//!
//! ## Features
//!
//! - **Knowledge Base**: Append-only snippets paired with their embeddings
//! - **Similarity Search**: Deterministic cosine-ranked top-k lookups
//! - **Orchestration**: A degrade-gracefully context entry point
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Retrieval Orchestrator                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  get_context ──► RwLock<KnowledgeBase> ──► EmbeddingProvider   │
//! │       │                   │                                     │
//! │       ▼                   ▼                                     │
//! │  context snippets    entries + embedding matrix                │
//! │                      (append-only, lockstep)                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use helpdesk_retrieval::RetrievalOrchestrator;
//!
//! let orchestrator = RetrievalOrchestrator::builder()
//!     .with_provider(provider)
//!     .build()?;
//! orchestrator.seed(&snippets).await?;
//!
//! let context = orchestrator.get_context("What are your hours?").await;
//! ```

pub mod config;
pub mod error;
pub mod knowledge;
pub mod orchestrator;

pub use config::RetrievalConfig;
pub use error::{Result, RetrievalError};
pub use knowledge::{KnowledgeBase, KnowledgeEntry, ScoredEntry};
pub use orchestrator::{IndexStats, RetrievalOrchestrator, RetrievalOrchestratorBuilder};

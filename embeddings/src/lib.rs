//! # Embeddings
//!
//! This crate provides embedding generation and vector similarity primitives
//! for the helpdesk retrieval stack.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert text to dense vectors, batch-first
//! - **Similarity**: Cosine ranking and distance helpers
//! - **Multiple Providers**: OpenAI API or a deterministic offline hasher
//! - **Caching**: In-memory caching of computed embeddings
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► Embedding ──► top_k_indices             │
//! │       │                    │              │                     │
//! │       ▼                    ▼              ▼                     │
//! │  OpenAI/Hashing      cosine_similarity  ranked hits            │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  CachedProvider ──► EmbeddingCache                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod error;
pub mod provider;
pub mod similarity;

pub use cache::{CachedProvider, EmbeddingCache};
pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, HashingProvider, OpenAIProvider, fnv1a};
pub use similarity::{cosine_similarity, euclidean_distance, normalize, top_k_indices};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of the offline hashing provider (MiniLM-class width).
pub const DEFAULT_DIMENSION: usize = 384;

//! # Curation
//!
//! This crate turns low-confidence answers into knowledge-base growth: it
//! buffers uncertain cases, clusters them, and promotes one representative
//! per cluster back into the retrieval index.
//!
//! ## Features
//!
//! - **Uncertainty Queue**: Buffer of (query, answer) pairs flagged as
//!   low-confidence
//! - **Pluggable Certainty**: Injectable evaluator deciding what gets queued
//! - **Seeded Clustering**: Reproducible k-means over query embeddings
//! - **Promotion**: Representatives appended through the retrieval write path
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Curation Engine                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  UncertaintyQueue ──► drain ──► kmeans ──► representatives     │
//! │       ▲                            │             │              │
//! │       │                            ▼             ▼              │
//! │  CertaintyEvaluator          cluster centroids  promote ──►    │
//! │                                                 RetrievalIndex  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod error;
pub mod kmeans;
pub mod queue;

pub use engine::{CurationConfig, CurationEngine};
pub use error::{CurationError, Result};
pub use kmeans::{KMeansResult, kmeans};
pub use queue::{
    AnswerLengthEvaluator, CertaintyEvaluator, DrainPolicy, UncertainCase, UncertaintyQueue,
};

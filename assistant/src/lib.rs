//! # Assistant
//!
//! This crate ties the helpdesk stack into one answering pipeline: retrieve
//! context, generate a reply, phrase it to match the customer's mood, and
//! queue low-confidence answers for curation.
//!
//! ## Features
//!
//! - **Responder Seam**: Opaque `generate(context, query)` collaborator
//! - **Sentiment Phrasing**: Tagged sentiment labels and reply templates
//! - **Uncertainty Hook**: Every raw answer runs past the certainty evaluator
//! - **Interaction Log**: In-memory analytics over answered queries
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Assistant                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  query ──► RetrievalOrchestrator ──► Responder ──► personalize │
//! │                    │                     │              │       │
//! │                    ▼                     ▼              ▼       │
//! │             context snippets    CertaintyEvaluator   reply     │
//! │                                        │                        │
//! │                                        ▼                        │
//! │                                 UncertaintyQueue               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod analytics;
pub mod error;
pub mod pipeline;
pub mod responder;
pub mod sentiment;

pub use analytics::{InteractionLog, InteractionRecord, InteractionSummary};
pub use error::{AssistantError, Result};
pub use pipeline::{Assistant, AssistantBuilder, AssistantConfig};
pub use responder::{ExtractiveResponder, OpenAIResponder, Responder};
pub use sentiment::{
    DEFAULT_CONFIDENCE_THRESHOLD, LexiconAnalyzer, Sentiment, SentimentAnalyzer, gate, personalize,
};

// Re-export from dependencies for convenience
pub use helpdesk_curation::{AnswerLengthEvaluator, CertaintyEvaluator, UncertaintyQueue};
pub use helpdesk_retrieval::RetrievalOrchestrator;

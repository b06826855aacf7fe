//! Configuration for the retrieval orchestrator.

use serde::{Deserialize, Serialize};

/// Configuration for the retrieval orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// How many context snippets a query pulls by default.
    pub top_k: usize,

    /// Deadline for a single search, including the embedding call, in
    /// seconds. A timeout degrades to empty context.
    pub embed_timeout_secs: u64,

    /// Embedding cache capacity; zero disables caching.
    pub cache_max_entries: usize,
}

impl RetrievalConfig {
    /// Set the default number of context snippets per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the search deadline in seconds.
    pub fn with_embed_timeout_secs(mut self, secs: u64) -> Self {
        self.embed_timeout_secs = secs;
        self
    }

    /// Set the embedding cache capacity (zero disables caching).
    pub fn with_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.cache_max_entries = max_entries;
        self
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            embed_timeout_secs: 10,
            cache_max_entries: 1024,
        }
    }
}

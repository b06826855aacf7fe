//! Top-level retrieval orchestration.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use helpdesk_embeddings::{CachedProvider, EmbeddingProvider};

use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::knowledge::{KnowledgeBase, ScoredEntry};

/// The single entry point tying retrieval to the rest of the pipeline.
///
/// Reads (`get_context`, `search`) run under a shared lock so queries can
/// overlap; writes (`extend_knowledge`) are exclusive, which is what keeps
/// the entry/embedding pairing intact under concurrency.
pub struct RetrievalOrchestrator {
    /// Configuration.
    config: RetrievalConfig,

    /// The knowledge base handle shared with writers.
    knowledge: Arc<RwLock<KnowledgeBase>>,
}

impl RetrievalOrchestrator {
    /// Create a new orchestrator builder.
    pub fn builder() -> RetrievalOrchestratorBuilder {
        RetrievalOrchestratorBuilder::new()
    }

    /// Initialize the orchestrator with the given provider and configuration.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: RetrievalConfig) -> Self {
        let provider: Arc<dyn EmbeddingProvider> = if config.cache_max_entries > 0 {
            Arc::new(CachedProvider::new(provider, config.cache_max_entries))
        } else {
            provider
        };
        info!(
            "initializing retrieval orchestrator with provider: {}",
            provider.name()
        );
        Self {
            config,
            knowledge: Arc::new(RwLock::new(KnowledgeBase::new(provider))),
        }
    }

    /// Seed the knowledge base with an initial corpus.
    pub async fn seed(&self, texts: &[String]) -> Result<()> {
        self.extend_knowledge(texts).await
    }

    /// Context snippets for a query, using the configured `top_k`.
    ///
    /// Degrade-gracefully: any internal failure is logged and surfaced as an
    /// empty result, which callers treat as "answer from general knowledge".
    pub async fn get_context(&self, query: &str) -> Vec<String> {
        self.get_context_k(query, self.config.top_k).await
    }

    /// Context snippets for a query with an explicit `k`.
    pub async fn get_context_k(&self, query: &str, k: usize) -> Vec<String> {
        match self.try_get_context(query, k).await {
            Ok(texts) => texts,
            Err(err) => {
                error!("context retrieval failed, continuing without context: {err}");
                Vec::new()
            }
        }
    }

    async fn try_get_context(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let scored = self.search(query, k).await?;
        Ok(scored.into_iter().map(|hit| hit.entry.text).collect())
    }

    /// Scored search results, bounded by the configured deadline.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredEntry>> {
        let deadline = Duration::from_secs(self.config.embed_timeout_secs);
        let knowledge = self.knowledge.read().await;
        let scored = tokio::time::timeout(deadline, knowledge.search(query, k))
            .await
            .map_err(|_| RetrievalError::ProviderTimeout {
                timeout_secs: self.config.embed_timeout_secs,
            })??;
        debug!("search returned {} hits for query", scored.len());
        Ok(scored)
    }

    /// The single write path: append snippets under the write lock.
    pub async fn extend_knowledge(&self, texts: &[String]) -> Result<()> {
        if texts.is_empty() {
            return Ok(());
        }
        let mut knowledge = self.knowledge.write().await;
        knowledge.append(texts).await
    }

    /// Handle to the underlying knowledge base, for callers that need read
    /// access beyond `get_context`.
    pub fn knowledge(&self) -> Arc<RwLock<KnowledgeBase>> {
        Arc::clone(&self.knowledge)
    }

    /// A snapshot of index state.
    pub async fn stats(&self) -> IndexStats {
        let knowledge = self.knowledge.read().await;
        IndexStats {
            entries: knowledge.len(),
            embeddings: knowledge.embedding_count(),
            dimension: knowledge.dimension(),
            provider: knowledge.provider_name().to_string(),
        }
    }
}

/// Builder for the retrieval orchestrator.
pub struct RetrievalOrchestratorBuilder {
    config: RetrievalConfig,
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl RetrievalOrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: RetrievalConfig::default(),
            provider: None,
        }
    }

    /// Set the embedding provider.
    pub fn with_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the default number of context snippets per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the full configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<RetrievalOrchestrator> {
        let provider = self.provider.ok_or(RetrievalError::ProviderMissing)?;
        Ok(RetrievalOrchestrator::new(provider, self.config))
    }
}

impl Default for RetrievalOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the knowledge index.
#[derive(Debug, Clone)]
pub struct IndexStats {
    /// Number of knowledge entries.
    pub entries: usize,

    /// Number of stored embeddings.
    pub embeddings: usize,

    /// Vector width, once fixed by the first append.
    pub dimension: Option<usize>,

    /// Name of the embedding provider.
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_embeddings::HashingProvider;

    #[tokio::test]
    async fn test_builder_requires_provider() {
        let result = RetrievalOrchestrator::builder().build();
        assert!(matches!(result, Err(RetrievalError::ProviderMissing)));
    }

    #[tokio::test]
    async fn test_stats_reflect_seeded_entries() {
        let orchestrator = RetrievalOrchestrator::builder()
            .with_provider(Arc::new(HashingProvider::new()))
            .build()
            .unwrap();

        orchestrator
            .seed(&["store hours".to_string(), "refund policy".to_string()])
            .await
            .unwrap();

        let stats = orchestrator.stats().await;
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.embeddings, 2);
        assert_eq!(stats.dimension, Some(helpdesk_embeddings::DEFAULT_DIMENSION));
        assert_eq!(stats.provider, "hashing");
    }
}

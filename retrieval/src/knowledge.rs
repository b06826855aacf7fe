//! The knowledge base: entries, their embedding matrix, and similarity
//! search over both.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use helpdesk_embeddings::{Embedding, EmbeddingProvider, top_k_indices};

use crate::error::{Result, RetrievalError};

/// A single knowledge-base snippet.
///
/// Entries are append-only: once created they are never edited or removed,
/// and ids are assigned monotonically in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Stable identifier, assigned in insertion order.
    pub id: u64,

    /// The snippet text.
    pub text: String,
}

/// A search hit with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    /// The matched entry.
    pub entry: KnowledgeEntry,

    /// Cosine similarity to the query, in [-1, 1].
    pub score: f32,
}

/// The knowledge base and its embedding matrix.
///
/// `entries` and `embeddings` move in lockstep: position i of one always
/// corresponds to position i of the other. Every mutation either keeps that
/// pairing or fails without touching either column.
pub struct KnowledgeBase {
    provider: Arc<dyn EmbeddingProvider>,
    entries: Vec<KnowledgeEntry>,
    embeddings: Vec<Embedding>,
    dimension: Option<usize>,
    next_id: u64,
}

impl KnowledgeBase {
    /// Create an empty knowledge base backed by the given provider.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            entries: Vec::new(),
            embeddings: Vec::new(),
            dimension: None,
            next_id: 0,
        }
    }

    /// Build a knowledge base seeded with an initial corpus.
    pub async fn with_entries(
        provider: Arc<dyn EmbeddingProvider>,
        texts: &[String],
    ) -> Result<Self> {
        let mut base = Self::new(provider);
        base.append(texts).await?;
        Ok(base)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the knowledge base is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Number of stored embeddings; equals [`len`](Self::len) for a healthy
    /// index.
    pub fn embedding_count(&self) -> usize {
        self.embeddings.len()
    }

    /// Vector width of the stored embeddings, once the first append fixed it.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Name of the backing embedding provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Append new snippets, embedding them in one batch call.
    ///
    /// All-or-nothing: a provider failure, a short batch reply, or a vector
    /// of the wrong width leaves the index exactly as it was.
    pub async fn append(&mut self, texts: &[String]) -> Result<()> {
        if texts.is_empty() {
            return Ok(());
        }
        self.check_integrity()?;

        let embeddings = self.provider.encode(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(helpdesk_embeddings::EmbeddingError::BatchSizeMismatch {
                sent: texts.len(),
                received: embeddings.len(),
            }
            .into());
        }
        let dimension = self.dimension.unwrap_or(embeddings[0].len());
        for embedding in &embeddings {
            if embedding.len() != dimension {
                return Err(helpdesk_embeddings::EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                }
                .into());
            }
        }

        // Validation is done; from here both columns grow together.
        for (text, embedding) in texts.iter().zip(embeddings) {
            self.entries.push(KnowledgeEntry {
                id: self.next_id,
                text: text.clone(),
            });
            self.embeddings.push(embedding);
            self.next_id += 1;
        }
        self.dimension = Some(dimension);

        info!(
            "appended {} snippets, knowledge base now holds {}",
            texts.len(),
            self.entries.len()
        );
        Ok(())
    }

    /// Top-k most similar entries for a free-text query.
    ///
    /// Results are ordered by descending cosine similarity; equal scores
    /// rank the earlier-added entry first. An empty knowledge base yields an
    /// empty result rather than an error, and `k` larger than the entry
    /// count returns everything.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredEntry>> {
        if k == 0 {
            return Err(RetrievalError::InvalidArgument(
                "k must be positive".to_string(),
            ));
        }
        self.check_integrity()?;
        if self.entries.is_empty() {
            debug!("search on empty knowledge base");
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.encode_one(query).await?;
        let ranked = top_k_indices(&query_embedding, &self.embeddings, k)?;

        Ok(ranked
            .into_iter()
            .map(|(index, score)| ScoredEntry {
                entry: self.entries[index].clone(),
                score,
            })
            .collect())
    }

    fn check_integrity(&self) -> Result<()> {
        if self.entries.len() != self.embeddings.len() {
            return Err(RetrievalError::CorruptIndex {
                entries: self.entries.len(),
                embeddings: self.embeddings.len(),
            });
        }
        Ok(())
    }
}

//! Clustering-based selection of representative uncertain cases.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use helpdesk_embeddings::{EmbeddingError, EmbeddingProvider, euclidean_distance};
use helpdesk_retrieval::RetrievalOrchestrator;

use crate::error::{CurationError, Result};
use crate::kmeans::kmeans;
use crate::queue::{UncertainCase, UncertaintyQueue};

/// Configuration for the curation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationConfig {
    /// Number of clusters, and so of representatives, per pass.
    pub n_clusters: usize,

    /// Seed for the clustering run.
    pub seed: u64,

    /// Iteration cap for Lloyd's algorithm.
    pub max_iters: usize,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            seed: 42,
            max_iters: 100,
        }
    }
}

/// Turns a pile of uncertain queries into a handful of knowledge-base
/// candidates.
///
/// Clustering near-duplicate queries and keeping only the member nearest
/// each centroid avoids flooding the knowledge base with variations of the
/// same unanswered question.
pub struct CurationEngine {
    provider: Arc<dyn EmbeddingProvider>,
    config: CurationConfig,
}

impl CurationEngine {
    /// Create an engine with the given provider and configuration.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: CurationConfig) -> Self {
        Self { provider, config }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(provider, CurationConfig::default())
    }

    /// Reduce uncertain cases to at most `n_clusters` representatives.
    ///
    /// With fewer cases than clusters the input comes back unchanged, in
    /// order — clustering is meaningless with fewer points than clusters.
    /// Otherwise each cluster contributes the member nearest its centroid,
    /// in cluster order, exactly `n_clusters` in total.
    pub async fn select_representatives(
        &self,
        cases: &[UncertainCase],
    ) -> Result<Vec<UncertainCase>> {
        if self.config.n_clusters == 0 {
            return Err(CurationError::InvalidArgument(
                "cluster count must be positive".to_string(),
            ));
        }
        if cases.len() < self.config.n_clusters {
            debug!(
                "{} cases for {} clusters, skipping clustering",
                cases.len(),
                self.config.n_clusters
            );
            return Ok(cases.to_vec());
        }

        let queries: Vec<String> = cases.iter().map(|case| case.query.clone()).collect();
        let embeddings = self.provider.encode(&queries).await?;
        if embeddings.len() != cases.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                sent: cases.len(),
                received: embeddings.len(),
            }
            .into());
        }

        let clustering = kmeans(
            &embeddings,
            self.config.n_clusters,
            self.config.seed,
            self.config.max_iters,
        )?;

        let mut representatives = Vec::with_capacity(self.config.n_clusters);
        for cluster in 0..self.config.n_clusters {
            let mut best: Option<(usize, f32)> = None;
            for (index, embedding) in embeddings.iter().enumerate() {
                if clustering.assignments[index] != cluster {
                    continue;
                }
                let distance = euclidean_distance(embedding, &clustering.centroids[cluster])?;
                let closer = match best {
                    None => true,
                    Some((_, nearest)) => distance < nearest,
                };
                if closer {
                    best = Some((index, distance));
                }
            }
            if let Some((index, _)) = best {
                representatives.push(cases[index].clone());
            }
        }

        info!(
            "selected {} representatives from {} uncertain cases",
            representatives.len(),
            cases.len()
        );
        Ok(representatives)
    }

    /// Feed approved representatives back into the knowledge base.
    ///
    /// This is the only path by which the knowledge base grows after
    /// seeding; it goes through the orchestrator's exclusive write path.
    pub async fn promote(
        &self,
        representatives: &[UncertainCase],
        orchestrator: &RetrievalOrchestrator,
    ) -> Result<()> {
        if representatives.is_empty() {
            return Ok(());
        }
        let texts: Vec<String> = representatives
            .iter()
            .map(|case| case.answer.clone())
            .collect();
        orchestrator.extend_knowledge(&texts).await?;
        info!(
            "promoted {} representatives into the knowledge base",
            texts.len()
        );
        Ok(())
    }

    /// One full curation pass: drain the queue, cluster, promote.
    ///
    /// Returns the number of promoted representatives. Meant for a periodic
    /// background task, never inline on the query-answering path.
    pub async fn run_pass(
        &self,
        queue: &mut UncertaintyQueue,
        orchestrator: &RetrievalOrchestrator,
    ) -> Result<usize> {
        let cases = queue.drain();
        if cases.is_empty() {
            debug!("curation pass found an empty queue");
            return Ok(0);
        }
        let representatives = self.select_representatives(&cases).await?;
        self.promote(&representatives, orchestrator).await?;
        Ok(representatives.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use helpdesk_embeddings::HashingProvider;
    use pretty_assertions::assert_eq;

    fn case(query: &str) -> UncertainCase {
        UncertainCase {
            query: query.to_string(),
            answer: format!("draft answer for {query}"),
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_short_circuit_returns_cases_unchanged() {
        let engine = CurationEngine::with_defaults(Arc::new(HashingProvider::new()));
        let cases = vec![case("a"), case("b"), case("c")];

        let representatives = engine.select_representatives(&cases).await.unwrap();

        assert_eq!(representatives, cases);
    }

    #[tokio::test]
    async fn test_zero_clusters_is_rejected() {
        let engine = CurationEngine::new(
            Arc::new(HashingProvider::new()),
            CurationConfig {
                n_clusters: 0,
                ..CurationConfig::default()
            },
        );

        let err = engine.select_representatives(&[case("a")]).await.unwrap_err();
        assert!(matches!(err, CurationError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_selection_is_deterministic() {
        let engine = CurationEngine::with_defaults(Arc::new(HashingProvider::new()));
        let cases: Vec<UncertainCase> = (0..12)
            .map(|i| case(&format!("how do i configure feature {i}")))
            .collect();

        let first = engine.select_representatives(&cases).await.unwrap();
        let second = engine.select_representatives(&cases).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[tokio::test]
    async fn test_representatives_are_distinct_cases() {
        let engine = CurationEngine::with_defaults(Arc::new(HashingProvider::new()));
        let cases: Vec<UncertainCase> = (0..12)
            .map(|i| case(&format!("question about topic {i}")))
            .collect();

        let representatives = engine.select_representatives(&cases).await.unwrap();

        let mut queries: Vec<&str> = representatives
            .iter()
            .map(|case| case.query.as_str())
            .collect();
        queries.sort_unstable();
        queries.dedup();
        assert_eq!(queries.len(), representatives.len());
    }
}

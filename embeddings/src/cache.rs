//! Embedding cache to avoid redundant provider calls.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::{EmbeddingProvider, fnv1a};

struct CacheEntry {
    embedding: Embedding,
    inserted_at: u64,
}

/// In-memory cache of computed embeddings, keyed by text.
///
/// Bounded: once `max_entries` is reached, the oldest entry is evicted on
/// insert.
pub struct EmbeddingCache {
    cache: Arc<RwLock<HashMap<u64, CacheEntry>>>,
    max_entries: usize,
    clock: Arc<RwLock<u64>>,
}

impl EmbeddingCache {
    /// Create a new cache holding at most `max_entries` embeddings.
    pub fn new(max_entries: usize) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            max_entries,
            clock: Arc::new(RwLock::new(0)),
        }
    }

    /// Get a cached embedding.
    pub async fn get(&self, text: &str) -> Option<Embedding> {
        let key = fnv1a(text.as_bytes());
        let cache = self.cache.read().await;
        cache.get(&key).map(|entry| entry.embedding.clone())
    }

    /// Put an embedding in the cache.
    pub async fn put(&self, text: &str, embedding: Embedding) {
        let key = fnv1a(text.as_bytes());
        let inserted_at = {
            let mut clock = self.clock.write().await;
            *clock += 1;
            *clock
        };

        let mut cache = self.cache.write().await;
        if cache.len() >= self.max_entries && !cache.contains_key(&key) {
            if let Some(oldest) = cache
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| *k)
            {
                cache.remove(&oldest);
            }
        }
        cache.insert(
            key,
            CacheEntry {
                embedding,
                inserted_at,
            },
        );
        debug!("cached embedding for text");
    }

    /// Number of cached embeddings.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Clear the cache.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
        info!("cleared embedding cache");
    }
}

/// A provider wrapper that serves repeat texts from an [`EmbeddingCache`].
///
/// Only cache misses are forwarded, batched into a single upstream call, so
/// re-embedding a mostly-known corpus costs one small request.
pub struct CachedProvider<P> {
    provider: P,
    cache: EmbeddingCache,
}

impl<P: EmbeddingProvider> CachedProvider<P> {
    /// Wrap a provider with a cache of at most `max_entries` embeddings.
    pub fn new(provider: P, max_entries: usize) -> Self {
        Self {
            provider,
            cache: EmbeddingCache::new(max_entries),
        }
    }

    /// Get the underlying cache.
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut slots: Vec<Option<Embedding>> = Vec::with_capacity(texts.len());
        let mut misses = Vec::new();

        for (index, text) in texts.iter().enumerate() {
            match self.cache.get(text).await {
                Some(embedding) => slots.push(Some(embedding)),
                None => {
                    slots.push(None);
                    misses.push(index);
                }
            }
        }

        if !misses.is_empty() {
            debug!(
                "{} of {} texts missed the embedding cache",
                misses.len(),
                texts.len()
            );
            let miss_texts: Vec<String> = misses.iter().map(|&i| texts[i].clone()).collect();
            let fresh = self.provider.encode(&miss_texts).await?;
            if fresh.len() != miss_texts.len() {
                return Err(EmbeddingError::BatchSizeMismatch {
                    sent: miss_texts.len(),
                    received: fresh.len(),
                });
            }
            for (&index, embedding) in misses.iter().zip(fresh) {
                self.cache.put(&texts[index], embedding.clone()).await;
                slots[index] = Some(embedding);
            }
        }

        let mut embeddings = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Some(embedding) => embeddings.push(embedding),
                None => {
                    return Err(EmbeddingError::InvalidResponse(
                        "cache fill left a hole".to_string(),
                    ));
                }
            }
        }
        Ok(embeddings)
    }

    fn is_available(&self) -> bool {
        self.provider.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::HashingProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        inner: HashingProvider,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.encode(texts).await
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_cache_put_get() {
        let cache = EmbeddingCache::new(100);
        let embedding = vec![1.0, 2.0, 3.0];

        cache.put("hello", embedding.clone()).await;

        assert_eq!(cache.get("hello").await, Some(embedding));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn test_cache_eviction() {
        let cache = EmbeddingCache::new(2);

        cache.put("a", vec![1.0]).await;
        cache.put("b", vec![2.0]).await;
        cache.put("c", vec![3.0]).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("c").await, Some(vec![3.0]));
    }

    #[tokio::test]
    async fn test_cached_provider_skips_known_texts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachedProvider::new(
            CountingProvider {
                inner: HashingProvider::new(),
                calls: Arc::clone(&calls),
            },
            100,
        );

        let texts = vec!["store hours".to_string(), "refund policy".to_string()];
        let first = provider.encode(&texts).await.unwrap();
        let second = provider.encode(&texts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_provider_batches_only_misses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachedProvider::new(
            CountingProvider {
                inner: HashingProvider::new(),
                calls: Arc::clone(&calls),
            },
            100,
        );

        provider.encode(&["a".to_string()]).await.unwrap();
        let mixed = vec!["a".to_string(), "b".to_string()];
        let embeddings = provider.encode(&mixed).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cache().len().await, 2);
    }
}

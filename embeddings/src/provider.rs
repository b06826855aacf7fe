//! Embedding providers.
//!
//! The provider seam is batch-first: the retrieval stack embeds a whole
//! knowledge base in one call and single queries as one-element batches.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::normalize;

/// Trait for embedding providers.
///
/// Implementations must return one vector per input text, in input order,
/// all of the same width for the lifetime of the provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Width of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Generate embeddings for a batch of texts.
    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Generate an embedding for a single text.
    async fn encode_one(&self, text: &str) -> Result<Embedding> {
        let batch = [text.to_string()];
        let mut embeddings = self.encode(&batch).await?;
        if embeddings.len() != 1 {
            return Err(EmbeddingError::BatchSizeMismatch {
                sent: 1,
                received: embeddings.len(),
            });
        }
        Ok(embeddings.remove(0))
    }

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

#[async_trait]
impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        (**self).encode(texts).await
    }

    async fn encode_one(&self, text: &str) -> Result<Embedding> {
        (**self).encode_one(text).await
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// OpenAI embedding provider.
pub struct OpenAIProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model to request.
    model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        match self.model.as_str() {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 1536,
        }
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        debug!(
            "requesting {} embeddings with model: {}",
            texts.len(),
            self.model
        );

        let body = serde_json::json!({
            "input": texts,
            "model": self.model
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let result: OpenAIEmbeddingResponse = response.json().await?;

        if result.data.len() != texts.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                sent: texts.len(),
                received: result.data.len(),
            });
        }

        let mut embeddings = Vec::with_capacity(result.data.len());
        let mut width = None;
        for item in result.data {
            // every vector in a reply must have the same width
            let expected = *width.get_or_insert(item.embedding.len());
            if item.embedding.len() != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: item.embedding.len(),
                });
            }
            embeddings.push(item.embedding);
        }

        info!("received {} embeddings from {}", embeddings.len(), self.model);

        Ok(embeddings)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    #[allow(dead_code)]
    index: usize,
}

/// 64-bit FNV-1a hash; stable across platforms and Rust versions, unlike
/// the std hasher.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Deterministic offline provider that feature-hashes lowercased
/// alphanumeric tokens into a fixed-width unit vector.
///
/// Shared tokens land in shared buckets, so cosine similarity tracks
/// lexical overlap. Suitable for tests and air-gapped deployments; swap in
/// a model-backed provider where real semantic quality matters.
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    /// Create a provider with the default dimension.
    pub fn new() -> Self {
        Self {
            dimension: crate::DEFAULT_DIMENSION,
        }
    }

    /// Create a provider with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        let tokens = text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty());
        for token in tokens {
            let hash = fnv1a(token.to_ascii_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::cosine_similarity;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_hashing_provider_is_deterministic() {
        let provider = HashingProvider::new();
        let texts = vec!["Our store hours are 9 AM to 5 PM.".to_string()];

        let first = provider.encode(&texts).await.unwrap();
        let second = provider.encode(&texts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].len(), crate::DEFAULT_DIMENSION);
    }

    #[tokio::test]
    async fn test_hashing_provider_tracks_token_overlap() {
        let provider = HashingProvider::new();
        let texts = vec![
            "What are your opening hours?".to_string(),
            "Our store hours are 9 AM to 5 PM.".to_string(),
            "We offer refunds within 30 days.".to_string(),
        ];

        let embeddings = provider.encode(&texts).await.unwrap();
        let hours = cosine_similarity(&embeddings[0], &embeddings[1]).unwrap();
        let refunds = cosine_similarity(&embeddings[0], &embeddings[2]).unwrap();

        assert!(hours > refunds, "expected {hours} > {refunds}");
    }

    #[tokio::test]
    async fn test_hashing_provider_empty_text_is_zero_vector() {
        let provider = HashingProvider::with_dimension(16);
        let embedding = provider.encode_one("  !!  ").await.unwrap();
        assert!(embedding.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_openai_provider_batch_encode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"embedding": [1.0, 0.0, 0.0], "index": 0},
                    {"embedding": [0.0, 1.0, 0.0], "index": 1},
                ],
                "model": "text-embedding-3-small",
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        let texts = vec!["first".to_string(), "second".to_string()];

        let embeddings = provider.encode(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], vec![1.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_openai_provider_short_reply_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"embedding": [1.0, 0.0], "index": 0},
                ],
                "model": "text-embedding-3-small",
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        let texts = vec!["first".to_string(), "second".to_string()];

        let err = provider.encode(&texts).await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::BatchSizeMismatch {
                sent: 2,
                received: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_openai_provider_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        let texts = vec!["first".to_string()];

        let err = provider.encode(&texts).await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::RateLimited {
                retry_after_secs: 7
            }
        ));
    }

    #[tokio::test]
    async fn test_openai_provider_requires_key() {
        let provider = OpenAIProvider {
            api_key: None,
            base_url: "http://localhost".to_string(),
            client: reqwest::Client::new(),
            model: "text-embedding-3-small".to_string(),
        };
        assert!(!provider.is_available());

        let err = provider.encode(&["text".to_string()]).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::ProviderNotConfigured));
    }
}

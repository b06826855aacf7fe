//! The generative responder seam.
//!
//! Generation itself is an external collaborator: the pipeline hands a
//! context string and a query to whatever implements [`Responder`] and takes
//! the text that comes back.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AssistantError, Result};

const SYSTEM_PROMPT: &str = "You are a helpful customer service assistant. \
Use the provided context to answer the user's question. If the context \
doesn't contain relevant information, use your general knowledge but mention \
that the information might not be specific to our company.";

/// Trait for generative responders.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce a natural-language answer from retrieved context and a query.
    async fn generate(&self, context: &str, query: &str) -> Result<String>;
}

/// OpenAI chat-completion responder.
pub struct OpenAIResponder {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model to request.
    model: String,

    /// Completion length cap.
    max_tokens: u32,

    /// Sampling temperature.
    temperature: f32,
}

impl OpenAIResponder {
    /// Create a new OpenAI responder.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::new(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 150,
            temperature: 0.7,
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

impl Default for OpenAIResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Responder for OpenAIResponder {
    async fn generate(&self, context: &str, query: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(AssistantError::ResponderNotConfigured)?;

        debug!("requesting completion with model: {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": format!("Context: {context}\n\nQuestion: {query}")},
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AssistantError::Generation(format!(
                "API error: {error_text}"
            )));
        }

        let result: ChatCompletionResponse = response.json().await?;
        let answer = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AssistantError::InvalidResponse("no choices in response".to_string()))?
            .message
            .content;

        Ok(answer.trim().to_string())
    }
}

/// Chat completion API response format.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Offline responder that answers with the retrieved context verbatim.
///
/// Stands in for a generative model in tests and air-gapped setups; with no
/// context to quote it asks the customer to rephrase.
pub struct ExtractiveResponder;

#[async_trait]
impl Responder for ExtractiveResponder {
    async fn generate(&self, context: &str, query: &str) -> Result<String> {
        if context.is_empty() {
            debug!("no context for query: {query}");
            return Ok(
                "I couldn't find anything on that. Could you rephrase your question?".to_string(),
            );
        }
        Ok(context.to_string())
    }
}

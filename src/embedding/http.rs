//! HTTP client for an external embedding service
//!
//! Speaks the OpenAI-compatible `/embeddings` format, which sentence-transformer
//! servers, text-embeddings-inference, Ollama and OpenAI itself all accept.
//! The pipeline is synchronous, so the client owns a small runtime and blocks
//! on each batched request. Do not call it from inside another async runtime.

use crate::core::config::EncoderConfig;
use crate::core::error::{GroundingError, Result};
use crate::embedding::{l2_normalize, Embedding, TextEncoder};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Blocking embedding client over an async HTTP transport
pub struct HttpEncoder {
    client: Client,
    runtime: Runtime,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl HttpEncoder {
    /// Create a client with explicit configuration
    pub fn new(api_url: String, model: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GroundingError::EncoderUnavailable(e.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            client,
            runtime,
            api_key,
            api_url,
            model,
        })
    }

    pub fn from_config(config: &EncoderConfig, api_key: Option<String>) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Create a client from environment variables, falling back to `config`
    ///
    /// Optional: EMBEDDING_API_URL, EMBEDDING_MODEL, EMBEDDING_API_KEY
    pub fn from_env(config: &EncoderConfig) -> Result<Self> {
        let api_url = std::env::var("EMBEDDING_API_URL").unwrap_or_else(|_| config.api_url.clone());
        let model = std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| config.model.clone());
        let api_key = std::env::var("EMBEDDING_API_KEY").ok();

        Self::new(api_url, model, api_key, Duration::from_secs(config.timeout_secs))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Send one embeddings request for the whole batch
    pub async fn encode_async(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GroundingError::EncoderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GroundingError::EncoderUnavailable(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| GroundingError::EncoderUnavailable(e.to_string()))?;

        collect_embeddings(body, texts.len())
    }
}

impl TextEncoder for HttpEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.runtime.block_on(self.encode_async(texts))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Order by `index`, check the count, and normalize
fn collect_embeddings(mut body: EmbeddingResponse, expected: usize) -> Result<Vec<Embedding>> {
    if body.data.len() != expected {
        return Err(GroundingError::EncoderUnavailable(format!(
            "expected {} embeddings, got {}",
            expected,
            body.data.len()
        )));
    }

    body.data.sort_by_key(|d| d.index);
    Ok(body
        .data
        .into_iter()
        .map(|d| {
            let mut v = d.embedding;
            l2_normalize(&mut v);
            v
        })
        .collect())
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

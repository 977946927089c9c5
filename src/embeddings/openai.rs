use crate::cache::EmbeddingCache;
use crate::config::EmbeddingsConfig;
use crate::embeddings::Embedder;
use crate::error::{Result, ShopbotError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on inputs per request accepted by OpenAI-compatible APIs
const MAX_BATCH_SIZE: usize = 2048;

/// Retries for a single query embedding
const QUERY_RETRIES: usize = 3;

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// A failed request, remembering whether trying again could help
struct RequestFailure {
    retryable: bool,
    error: ShopbotError,
}

/// Client for OpenAI-compatible `/embeddings` endpoints
///
/// Handles batch splitting, retry with exponential backoff on 429/5xx, and an
/// optional LRU cache for query embeddings.
pub struct OpenAIEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
    cache: Option<Arc<EmbeddingCache>>,
}

impl OpenAIEmbedder {
    pub fn new(config: &EmbeddingsConfig, api_key: String) -> Result<Self> {
        Self::new_with_cache(config, api_key, None)
    }

    /// Create an embedder that consults `cache` for single-query embeddings
    pub fn new_with_cache(
        config: &EmbeddingsConfig,
        api_key: String,
        cache: Option<Arc<EmbeddingCache>>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ShopbotError::Embedding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.clamp(1, MAX_BATCH_SIZE),
            cache,
        })
    }

    /// Single API request for one batch of texts
    async fn request(&self, texts: Vec<String>) -> std::result::Result<Vec<Vec<f32>>, RequestFailure> {
        let expected = texts.len();
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts,
            dimensions: Some(self.dimensions),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| RequestFailure {
                retryable: e.is_timeout() || e.is_connect(),
                error: ShopbotError::Embedding(format!("Network error: {}", e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(RequestFailure {
                retryable: is_retryable(status),
                error: ShopbotError::Embedding(format!("Embedding API error {}: {}", status, body)),
            });
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| RequestFailure {
            retryable: false,
            error: ShopbotError::Embedding(format!("Failed to parse response: {}", e)),
        })?;

        if result.data.len() != expected {
            return Err(RequestFailure {
                retryable: false,
                error: ShopbotError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    expected,
                    result.data.len()
                )),
            });
        }

        let embeddings: Vec<Vec<f32>> = result.data.into_iter().map(|d| d.embedding).collect();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(RequestFailure {
                retryable: false,
                error: ShopbotError::Embedding(format!(
                    "Unexpected embedding dimension: expected {}, got {}",
                    self.dimensions,
                    bad.len()
                )),
            });
        }
        Ok(embeddings)
    }

    /// One batch with exponential backoff on retryable failures
    async fn request_with_retry(&self, texts: Vec<String>, max_retries: usize) -> Result<Vec<Vec<f32>>> {
        let start = std::time::Instant::now();
        let mut attempt = 0;
        let mut delay = Duration::from_secs(1);

        loop {
            match self.request(texts.clone()).await {
                Ok(embeddings) => {
                    log::debug!("Embedding API call took {:?} (attempt {})", start.elapsed(), attempt + 1);
                    return Ok(embeddings);
                }
                Err(failure) if failure.retryable && attempt < max_retries => {
                    log::warn!("Retry {}/{} after error: {}", attempt + 1, max_retries, failure.error);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(text) {
                log::debug!("Cache hit for query: {}", text);
                return Ok(cached);
            }
        }

        let embedding = self
            .request_with_retry(vec![text.to_string()], QUERY_RETRIES)
            .await?
            .pop()
            .ok_or_else(|| ShopbotError::Embedding("Empty response from embedding API".to_string()))?;

        if let Some(cache) = &self.cache {
            cache.put(text, embedding.clone());
        }
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let embeddings = self.request_with_retry(chunk.to_vec(), QUERY_RETRIES).await?;
            all_embeddings.extend(embeddings);

            // Spread full batches out a little to stay under rate limits
            if chunk.len() == self.batch_size {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

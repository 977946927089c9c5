use crate::config::LlmConfig;
use crate::error::{Result, ShopbotError};
use crate::llm::{ChatMessage, CompletionRequest, LlmClient};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints (NVIDIA hosted by default)
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_retries: usize,
    backoff_unit: Duration,
}

impl ChatCompletionsClient {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShopbotError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_retries: config.max_retries,
            backoff_unit: Duration::from_secs(1),
        })
    }

    /// Scale the rate-limit backoff; the schedule keeps its 2, 3, 5... shape
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatCompletionsRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopbotError::Llm(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ShopbotError::RateLimited(text));
            }
            return Err(ShopbotError::Llm(format!("Chat API error {}: {}", status, text)));
        }

        let parsed: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| ShopbotError::Llm(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ShopbotError::Llm("Empty response from chat API".to_string()))
    }
}

/// Wait before retry number `attempt + 1`, in backoff units: 2, 3, 5, 9...
pub fn retry_delay_units(attempt: u32) -> u32 {
    2u32.saturating_pow(attempt).saturating_add(1)
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let start = std::time::Instant::now();
        let mut attempt: u32 = 0;

        loop {
            match self.send(&request).await {
                Ok(text) => {
                    log::debug!("Chat API call took {:?} (attempt {})", start.elapsed(), attempt + 1);
                    return Ok(text);
                }
                Err(ShopbotError::RateLimited(body)) if (attempt as usize) < self.max_retries => {
                    let wait = self.backoff_unit * retry_delay_units(attempt);
                    log::warn!(
                        "Rate limit hit, waiting {:?} before retry {}/{}",
                        wait,
                        attempt + 1,
                        self.max_retries
                    );
                    log::debug!("Rate limit body: {}", body);
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

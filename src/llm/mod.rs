//! Hosted chat-completion access.
//!
//! Agents and the fallback path talk to the model through [`LlmClient`], so
//! tests can script replies without a network.

pub mod client;
pub mod prompts;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::ChatCompletionsClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Single user turn
    pub fn from_prompt(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Return the assistant text for `request`.
    ///
    /// Fails with `RateLimited` once 429 retries are exhausted and `Llm` for
    /// any other failure.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Model identifier, for logs and the health endpoint
    fn model(&self) -> &str;
}

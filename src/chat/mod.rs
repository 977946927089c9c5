//! The chat flow: validate, route to an agent, fall back to retrieval, and
//! turn failures into apologies.

pub mod fallback;

use crate::agents::{AgentDeps, AgentManager, AgentsHealth, AgentsOverview};
use crate::cache::{CacheStats, EmbeddingCache};
use crate::catalog::queries;
use crate::config::Config;
use crate::db::Db;
use crate::embeddings::Embedder;
use crate::error::{Result, ShopbotError};
use crate::llm::LlmClient;
use crate::search::VectorStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub use fallback::Fallback;

const RATE_LIMIT_REPLY: &str = "I'm happy you're chatting with me! However, the language model's rate limit has been exceeded. Please try again in a few seconds. 😊\n\nAlternatively, you can ask:\n• 'What products do you have?' (answered from database)\n• General questions about products and categories";

const ERROR_REPLY: &str = "Sorry, I ran into a problem while answering that. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub source: String,
}

impl ChatReply {
    pub fn new(response: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            source: source.into(),
        }
    }

    /// Apology for an external failure, tagged `rate_limit` or `error`
    pub fn apology(error: &ShopbotError) -> Self {
        let text = match error {
            ShopbotError::RateLimited(_) => RATE_LIMIT_REPLY,
            _ => ERROR_REPLY,
        };
        Self::new(text, error.source_tag())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthComponents {
    pub llm: bool,
    pub vector_store: bool,
    pub sql_database: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub components: HealthComponents,
    pub llm_model: String,
    pub vector_documents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_cache: Option<CacheStats>,
    pub checked_at: DateTime<Utc>,
}

/// Everything a chat request needs, shared across requests
pub struct ChatService {
    db: Db,
    manager: AgentManager,
    fallback: Fallback,
    vector_store: VectorStore,
    llm: Arc<dyn LlmClient>,
    embedding_cache: Option<Arc<EmbeddingCache>>,
    max_message_chars: usize,
}

impl ChatService {
    pub fn new(config: &Config, db: Db, embedder: Arc<dyn Embedder>, llm: Arc<dyn LlmClient>) -> Self {
        let deps = AgentDeps {
            db: db.clone(),
            llm: config.agents.llm_commentary.then(|| llm.clone()),
            temperature: config.llm.agent_temperature,
            max_tokens: config.llm.max_tokens,
        };
        let vector_store = VectorStore::new(db.clone(), embedder);
        let fallback = Fallback::new(
            vector_store.clone(),
            llm.clone(),
            config.search.clone(),
            config.llm.temperature,
            config.llm.max_tokens,
        );

        Self {
            db,
            manager: AgentManager::new(deps),
            fallback,
            vector_store,
            llm,
            embedding_cache: None,
            max_message_chars: config.http_server.max_message_chars,
        }
    }

    /// Report this cache's counters on the health endpoint
    pub fn with_embedding_cache(mut self, cache: Option<Arc<EmbeddingCache>>) -> Self {
        self.embedding_cache = cache;
        self
    }

    /// Answer one message.
    ///
    /// Only invalid input is an `Err`; every other failure becomes an
    /// apology reply.
    pub async fn chat(&self, message: &str) -> Result<ChatReply> {
        let message = self.validate(message)?;

        let decision = self.manager.route(message);
        if let Some(kind) = decision.agent {
            match self.manager.dispatch(kind, message).await {
                Ok(reply) => return Ok(ChatReply::new(reply.text, reply.source)),
                Err(e) => {
                    log::error!("{} Error: {}; falling back to retrieval", kind.log_prefix(), e);
                }
            }
        }

        match self.fallback.answer(message).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                match &e {
                    ShopbotError::RateLimited(_) => log::warn!("[Rate Limit] Chat model rate limit exceeded: {}", e),
                    _ => log::error!("[Fallback] Failed: {}", e),
                }
                Ok(ChatReply::apology(&e))
            }
        }
    }

    fn validate<'a>(&self, message: &'a str) -> Result<&'a str> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(ShopbotError::InvalidInput("message must not be empty".to_string()));
        }
        let chars = trimmed.chars().count();
        if chars > self.max_message_chars {
            return Err(ShopbotError::InvalidInput(format!(
                "message is {} characters; the limit is {}",
                chars, self.max_message_chars
            )));
        }
        Ok(trimmed)
    }

    pub fn agents_overview(&self) -> AgentsOverview {
        self.manager.overview()
    }

    pub async fn agents_health(&self) -> AgentsHealth {
        self.manager.health_check().await
    }

    pub async fn health(&self) -> HealthReport {
        let sql_database = match queries::category_count(&self.db).await {
            Ok(n) => n > 0,
            Err(e) => {
                log::warn!("[Health] SQL database check failed: {}", e);
                false
            }
        };
        let vector_documents = match self.vector_store.embedded_count().await {
            Ok(n) => n,
            Err(e) => {
                log::warn!("[Health] Vector store check failed: {}", e);
                0
            }
        };
        let components = HealthComponents {
            llm: true,
            vector_store: vector_documents > 0,
            sql_database,
        };
        let status = if components.sql_database && components.vector_store {
            "healthy"
        } else {
            "degraded"
        };

        HealthReport {
            status,
            components,
            llm_model: self.llm.model().to_string(),
            vector_documents,
            embedding_cache: self.embedding_cache.as_ref().map(|c| c.stats()),
            checked_at: Utc::now(),
        }
    }
}

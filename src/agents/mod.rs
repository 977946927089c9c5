//! Keyword-triggered specialist agents.
//!
//! Each agent owns one query domain: it picks one fixed catalog query from the
//! utterance, formats the rows, and optionally asks the model for a comment.

pub mod categories;
pub mod manager;
pub mod products;
pub mod retailers;
pub mod router;
pub mod terms;

use crate::db::Db;
use crate::error::Result;
use crate::llm::prompts::{self, Persona};
use crate::llm::{CompletionRequest, LlmClient};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

pub use categories::CategoriesAgent;
pub use manager::{AgentHealth, AgentManager, AgentsHealth, AgentsOverview};
pub use products::ProductsAgent;
pub use retailers::RetailersAgent;
pub use router::{Confidence, RouteDecision, Router};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Categories,
    Products,
    Retailers,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Categories, AgentKind::Products, AgentKind::Retailers];

    /// Tie-break rank; lower wins
    pub fn priority(self) -> u8 {
        match self {
            AgentKind::Products => 0,
            AgentKind::Retailers => 1,
            AgentKind::Categories => 2,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            AgentKind::Categories => "categories",
            AgentKind::Products => "products",
            AgentKind::Retailers => "retailers",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AgentKind::Categories => "Categories",
            AgentKind::Products => "Products",
            AgentKind::Retailers => "Retailers",
        }
    }

    /// `source` reported to chat clients
    pub fn source_tag(self) -> &'static str {
        match self {
            AgentKind::Categories => "categories_agent",
            AgentKind::Products => "products_agent",
            AgentKind::Retailers => "retailers_agent",
        }
    }

    pub fn log_prefix(self) -> &'static str {
        match self {
            AgentKind::Categories => "[Categories Agent]",
            AgentKind::Products => "[Products Agent]",
            AgentKind::Retailers => "[Retailers Agent]",
        }
    }

    fn persona(self) -> Persona {
        match self {
            AgentKind::Categories => Persona::Categories,
            AgentKind::Products => Persona::Products,
            AgentKind::Retailers => Persona::Retailers,
        }
    }
}

/// What an agent hands back for one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub agent: AgentKind,
    pub text: String,
    /// The rows the reply was rendered from, as JSON
    pub rows: serde_json::Value,
    pub row_count: usize,
    pub source: &'static str,
}

impl AgentReply {
    pub fn new<T: Serialize>(agent: AgentKind, text: String, rows: &[T]) -> Self {
        Self {
            agent,
            text,
            rows: serde_json::to_value(rows).unwrap_or(serde_json::Value::Null),
            row_count: rows.len(),
            source: agent.source_tag(),
        }
    }
}

/// Static description served by the agent-info endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub specialization: &'static str,
    pub keywords: Vec<&'static str>,
    pub capabilities: Vec<&'static str>,
    pub priority: u8,
}

/// Handles the agents share
#[derive(Clone)]
pub struct AgentDeps {
    pub db: Db,
    /// `None` disables commentary
    pub llm: Option<Arc<dyn LlmClient>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl AgentDeps {
    /// Same handles, but no model calls; used for health probes
    pub fn without_llm(&self) -> Self {
        Self {
            llm: None,
            ..self.clone()
        }
    }

    /// Ask the model for a short comment on the rows. Failures only cost the comment.
    pub async fn commentary(&self, agent: AgentKind, utterance: &str, rows: Vec<String>) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let prompt = prompts::agent_commentary(agent.persona(), utterance, &rows);
        let request = CompletionRequest::from_prompt(prompt, self.temperature, self.max_tokens);

        match llm.complete(request).await {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("{} Commentary unavailable: {}", agent.log_prefix(), e);
                None
            }
        }
    }
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    fn specialization(&self) -> &'static str;

    /// Routing keywords; a keyword's weight is its word count
    fn keywords(&self) -> &'static [&'static str];

    fn capabilities(&self) -> &'static [&'static str];

    /// Utterance used by the health probe; must produce rows on a seeded catalog
    fn probe_utterance(&self) -> &'static str;

    /// Answer one utterance. An empty result is a reply, not an error.
    async fn handle(&self, utterance: &str, deps: &AgentDeps) -> Result<AgentReply>;

    fn info(&self) -> AgentInfo {
        AgentInfo {
            name: self.kind().display_name(),
            specialization: self.specialization(),
            keywords: self.keywords().to_vec(),
            capabilities: self.capabilities().to_vec(),
            priority: self.kind().priority(),
        }
    }
}

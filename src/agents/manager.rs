use crate::agents::{
    Agent, AgentDeps, AgentInfo, AgentKind, AgentReply, CategoriesAgent, ProductsAgent, RetailersAgent,
    RouteDecision, Router,
};
use crate::error::{Result, ShopbotError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const ROUTING_STRATEGY: &str = "weighted_keyword_matching_with_priority_tie_break";

#[derive(Debug, Clone, Serialize)]
pub struct AgentsOverview {
    pub total_agents: usize,
    pub agents: BTreeMap<&'static str, AgentInfo>,
    pub routing_strategy: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentHealth {
    /// `healthy`, `unhealthy` (probe returned nothing) or `error`
    pub status: &'static str,
    pub last_test: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub agent_info: AgentInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentsHealth {
    pub overall_health: &'static str,
    pub agents: BTreeMap<&'static str, AgentHealth>,
    pub checked_at: DateTime<Utc>,
}

/// Owns the agents, routes utterances to them, and reports on them
pub struct AgentManager {
    agents: Vec<Box<dyn Agent>>,
    router: Router,
    deps: AgentDeps,
}

impl AgentManager {
    /// Manager over the three catalog agents
    pub fn new(deps: AgentDeps) -> Self {
        Self::with_agents(
            vec![Box::new(CategoriesAgent), Box::new(ProductsAgent), Box::new(RetailersAgent)],
            deps,
        )
    }

    pub fn with_agents(agents: Vec<Box<dyn Agent>>, deps: AgentDeps) -> Self {
        let router = Router::new(&agents);
        for agent in &agents {
            log::info!(
                "✓ {} Agent initialized - Specialization: {}",
                agent.kind().display_name(),
                agent.specialization()
            );
        }
        Self { agents, router, deps }
    }

    pub fn route(&self, utterance: &str) -> RouteDecision {
        let decision = self.router.route(utterance);
        match decision.agent {
            Some(kind) => log::info!("[Agent Manager] Selected agent: {} ({:?})", kind.display_name(), decision.confidence),
            None => log::info!("[Agent Manager] No agent matched: {}", utterance),
        }
        decision
    }

    fn agent(&self, kind: AgentKind) -> Result<&dyn Agent> {
        self.agents
            .iter()
            .find(|a| a.kind() == kind)
            .map(|a| a.as_ref())
            .ok_or_else(|| ShopbotError::NotFound(format!("agent {}", kind.id())))
    }

    pub async fn dispatch(&self, kind: AgentKind, utterance: &str) -> Result<AgentReply> {
        self.agent(kind)?.handle(utterance, &self.deps).await
    }

    pub fn overview(&self) -> AgentsOverview {
        AgentsOverview {
            total_agents: self.agents.len(),
            agents: self.agents.iter().map(|a| (a.kind().id(), a.info())).collect(),
            routing_strategy: ROUTING_STRATEGY,
        }
    }

    /// Run every agent's probe utterance without model calls
    pub async fn health_check(&self) -> AgentsHealth {
        let deps = self.deps.without_llm();
        let mut agents = BTreeMap::new();

        for agent in &self.agents {
            let health = match agent.handle(agent.probe_utterance(), &deps).await {
                Ok(reply) if reply.row_count > 0 => AgentHealth {
                    status: "healthy",
                    last_test: "passed",
                    error: None,
                    agent_info: agent.info(),
                },
                Ok(_) => AgentHealth {
                    status: "unhealthy",
                    last_test: "failed",
                    error: Some("probe returned no rows".to_string()),
                    agent_info: agent.info(),
                },
                Err(e) => {
                    log::warn!("{} Health probe failed: {}", agent.kind().log_prefix(), e);
                    AgentHealth {
                        status: "error",
                        last_test: "failed",
                        error: Some(e.to_string()),
                        agent_info: agent.info(),
                    }
                }
            };
            agents.insert(agent.kind().id(), health);
        }

        let overall_health = if agents.values().all(|h| h.status == "healthy") {
            "healthy"
        } else {
            "degraded"
        };
        AgentsHealth {
            overall_health,
            agents,
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Confidence;
    use crate::db::Db;
    use crate::test_support::{migrated_db, seeded_db, FakeLlm};
    use std::sync::Arc;

    fn manager(db: Db, llm: Option<Arc<FakeLlm>>) -> AgentManager {
        AgentManager::new(AgentDeps {
            db,
            llm: llm.map(|l| l as Arc<dyn crate::llm::LlmClient>),
            temperature: 0.3,
            max_tokens: 128,
        })
    }

    #[tokio::test]
    async fn test_route_and_dispatch() {
        let (db, _dir) = seeded_db().await;
        let manager = manager(db, None);

        let decision = manager.route("Who sells smartphones?");
        assert_eq!(decision.agent, Some(AgentKind::Retailers));
        assert_eq!(decision.confidence, Confidence::High);

        let reply = manager.dispatch(AgentKind::Retailers, "Who sells smartphones?").await.unwrap();
        assert_eq!(reply.row_count, 5);
    }

    #[test]
    fn test_overview() {
        let manager = manager(Db::new("unused.db"), None);
        let overview = manager.overview();

        assert_eq!(overview.total_agents, 3);
        assert_eq!(overview.routing_strategy, ROUTING_STRATEGY);
        assert_eq!(overview.agents["retailers"].name, "Retailers");
        assert!(overview.agents["retailers"].keywords.contains(&"who sells"));
        assert_eq!(overview.agents["products"].priority, 0);
    }

    #[tokio::test]
    async fn test_health_check_skips_llm() {
        let (db, _dir) = seeded_db().await;
        let llm = Arc::new(FakeLlm::replying("unused"));
        let manager = manager(db, Some(llm.clone()));

        let health = manager.health_check().await;
        assert_eq!(health.overall_health, "healthy");
        assert_eq!(health.agents.len(), 3);
        assert!(health.agents.values().all(|h| h.last_test == "passed"));
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_health_check_degraded_on_empty_catalog() {
        let (db, _dir) = migrated_db().await;
        let health = manager(db, None).health_check().await;

        assert_eq!(health.overall_health, "degraded");
        assert_eq!(health.agents["categories"].status, "unhealthy");
    }

    #[tokio::test]
    async fn test_health_check_reports_database_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory is not a database
        let health = manager(Db::new(dir.path()), None).health_check().await;

        assert_eq!(health.overall_health, "degraded");
        assert!(health.agents.values().all(|h| h.status == "error"));
    }
}

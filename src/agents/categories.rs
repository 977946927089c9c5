use crate::agents::{Agent, AgentDeps, AgentKind, AgentReply};
use crate::catalog::queries;
use crate::error::Result;
use crate::format;
use async_trait::async_trait;

const KEYWORDS: &[&str] = &[
    "categories",
    "category",
    "browse",
    "explore",
    "types",
    "kinds",
    "what do you have",
    "what's available",
    "sections",
    "departments",
];

const CAPABILITIES: &[&str] = &[
    "List all product categories",
    "Explain category contents",
    "Category-based recommendations",
    "Navigation assistance",
    "Category comparisons",
];

pub struct CategoriesAgent;

#[async_trait]
impl Agent for CategoriesAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Categories
    }

    fn specialization(&self) -> &'static str {
        "Product categories, browsing, and navigation"
    }

    fn keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn capabilities(&self) -> &'static [&'static str] {
        CAPABILITIES
    }

    fn probe_utterance(&self) -> &'static str {
        "what categories do you have"
    }

    async fn handle(&self, utterance: &str, deps: &AgentDeps) -> Result<AgentReply> {
        let kind = self.kind();
        log::info!("{} Processing query: {}", kind.log_prefix(), utterance);
        let lower = utterance.to_lowercase();

        let rows = if lower.contains("categories") || lower.contains("what do you have") {
            queries::list_categories(&deps.db).await?
        } else {
            queries::categories_with_counts(&deps.db).await?
        };
        log::info!("{} {} rows", kind.log_prefix(), rows.len());

        if rows.is_empty() {
            return Ok(AgentReply::new(kind, format::categories_not_found(), &rows));
        }

        let prompt_rows = rows.iter().map(format::category_prompt_row).collect();
        let commentary = deps.commentary(kind, utterance, prompt_rows).await;
        let text = format::format_categories(&rows, commentary.as_deref());
        Ok(AgentReply::new(kind, text, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{migrated_db, seeded_db, FakeLlm};
    use std::sync::Arc;

    fn deps(db: crate::db::Db, llm: Option<Arc<FakeLlm>>) -> AgentDeps {
        AgentDeps {
            db,
            llm: llm.map(|l| l as Arc<dyn crate::llm::LlmClient>),
            temperature: 0.3,
            max_tokens: 128,
        }
    }

    #[tokio::test]
    async fn test_lists_category_names() {
        let (db, _dir) = seeded_db().await;
        let llm = Arc::new(FakeLlm::replying("Lots to explore!"));
        let reply = CategoriesAgent
            .handle("What categories do you have?", &deps(db, Some(llm.clone())))
            .await
            .unwrap();

        assert_eq!(reply.source, "categories_agent");
        assert_eq!(reply.row_count, 3);
        assert!(reply.text.contains("📚 **Books**"));
        assert!(reply.text.contains("Lots to explore!"));
        assert!(llm.prompts()[0].contains("Categories Expert"));
    }

    #[tokio::test]
    async fn test_counts_for_browse_queries() {
        let (db, _dir) = seeded_db().await;
        let reply = CategoriesAgent.handle("let me browse", &deps(db, None)).await.unwrap();

        assert!(reply.text.contains("💻 **Electronics** (4 products)"));
        assert_eq!(reply.rows[0]["product_count"], 4);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_not_an_error() {
        let (db, _dir) = migrated_db().await;
        let reply = CategoriesAgent.handle("categories", &deps(db, None)).await.unwrap();
        assert_eq!(reply.row_count, 0);
        assert!(reply.text.contains("No categories"));
    }
}

use crate::agents::terms;
use crate::agents::{Agent, AgentDeps, AgentKind, AgentReply};
use crate::catalog::{queries, ProductFilter, ProductOrder};
use crate::error::Result;
use crate::format;
use async_trait::async_trait;

const KEYWORDS: &[&str] = &[
    "product",
    "products",
    "laptop",
    "smartphone",
    "phone",
    "tablet",
    "headphone",
    "book",
    "novel",
    "chair",
    "coffee",
    "maker",
    "show me",
    "find",
    "search",
    "price",
    "cost",
    "buy",
    "purchase",
    "electronics",
    "books",
    "furniture",
];

const CAPABILITIES: &[&str] = &[
    "Product search and discovery",
    "Price information and comparisons",
    "Product recommendations",
    "Category-based filtering",
    "Product details and specifications",
];

const NAMED_LIMIT: usize = 5;
const BROAD_LIMIT: usize = 10;

/// The single catalog query an utterance maps to
#[derive(Debug, Clone, PartialEq)]
enum ProductQuery {
    Summaries {
        filter: ProductFilter,
        order: ProductOrder,
        limit: usize,
    },
    Listing,
}

fn select_query(lower: &str) -> ProductQuery {
    let summaries = |filter, order, limit| ProductQuery::Summaries { filter, order, limit };

    if let Some(name) = terms::named_product(lower) {
        return summaries(ProductFilter::NameLike(name.to_string()), ProductOrder::Catalog, NAMED_LIMIT);
    }
    if let Some(category) = terms::named_category(lower) {
        return summaries(ProductFilter::Category(category.to_string()), ProductOrder::Catalog, NAMED_LIMIT);
    }
    if ["price", "cost", "cheap"].iter().any(|k| lower.contains(k)) {
        return summaries(ProductFilter::All, ProductOrder::CheapestFirst, BROAD_LIMIT);
    }
    if ["what products", "list products", "available"].iter().any(|k| lower.contains(k)) {
        return ProductQuery::Listing;
    }
    match terms::search_term(lower) {
        Some(term) => summaries(ProductFilter::Text(term), ProductOrder::Catalog, BROAD_LIMIT),
        None => summaries(ProductFilter::All, ProductOrder::Catalog, BROAD_LIMIT),
    }
}

pub struct ProductsAgent;

#[async_trait]
impl Agent for ProductsAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Products
    }

    fn specialization(&self) -> &'static str {
        "Product search, details, and recommendations"
    }

    fn keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn capabilities(&self) -> &'static [&'static str] {
        CAPABILITIES
    }

    fn probe_utterance(&self) -> &'static str {
        "show me products"
    }

    async fn handle(&self, utterance: &str, deps: &AgentDeps) -> Result<AgentReply> {
        let kind = self.kind();
        log::info!("{} Processing query: {}", kind.log_prefix(), utterance);
        let query = select_query(&utterance.to_lowercase());
        log::debug!("{} Selected {:?}", kind.log_prefix(), query);

        match query {
            ProductQuery::Listing => {
                let rows = queries::product_listing(&deps.db).await?;
                if rows.is_empty() {
                    return Ok(AgentReply::new(kind, format::products_not_found("any product"), &rows));
                }
                let prompt_rows = rows.iter().map(format::listing_prompt_row).collect();
                let commentary = deps.commentary(kind, utterance, prompt_rows).await;
                Ok(AgentReply::new(kind, format::format_product_listing(&rows, commentary.as_deref()), &rows))
            }
            ProductQuery::Summaries { filter, order, limit } => {
                let rows = queries::product_price_summaries(&deps.db, &filter, order, Some(limit)).await?;
                log::info!("{} {} rows for {}", kind.log_prefix(), rows.len(), filter.describe());
                if rows.is_empty() {
                    return Ok(AgentReply::new(kind, format::products_not_found(&filter.describe()), &rows));
                }
                let prompt_rows = rows.iter().map(format::product_prompt_row).collect();
                let commentary = deps.commentary(kind, utterance, prompt_rows).await;
                Ok(AgentReply::new(kind, format::format_product_summaries(&rows, commentary.as_deref()), &rows))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seeded_db, FakeLlm, FakeReply};
    use std::sync::Arc;

    fn deps(db: crate::db::Db, llm: Option<Arc<FakeLlm>>) -> AgentDeps {
        AgentDeps {
            db,
            llm: llm.map(|l| l as Arc<dyn crate::llm::LlmClient>),
            temperature: 0.3,
            max_tokens: 128,
        }
    }

    #[test]
    fn test_query_selection() {
        assert_eq!(
            select_query("show me laptops"),
            ProductQuery::Summaries {
                filter: ProductFilter::NameLike("Laptop".to_string()),
                order: ProductOrder::Catalog,
                limit: NAMED_LIMIT
            }
        );
        assert_eq!(
            select_query("any good books?"),
            ProductQuery::Summaries {
                filter: ProductFilter::Category("Books".to_string()),
                order: ProductOrder::Catalog,
                limit: NAMED_LIMIT
            }
        );
        assert_eq!(
            select_query("what's cheap right now"),
            ProductQuery::Summaries {
                filter: ProductFilter::All,
                order: ProductOrder::CheapestFirst,
                limit: BROAD_LIMIT
            }
        );
        assert_eq!(select_query("what products are available?"), ProductQuery::Listing);
        assert_eq!(
            select_query("search for espresso"),
            ProductQuery::Summaries {
                filter: ProductFilter::Text("espresso".to_string()),
                order: ProductOrder::Catalog,
                limit: BROAD_LIMIT
            }
        );
    }

    #[tokio::test]
    async fn test_smartphone_price_range() {
        let (db, _dir) = seeded_db().await;
        let reply = ProductsAgent.handle("Smartphone prices", &deps(db, None)).await.unwrap();

        assert_eq!(reply.source, "products_agent");
        assert_eq!(reply.row_count, 1);
        assert!(reply.text.contains("🛍️ **Smartphone**"));
        assert!(reply.text.contains("💰 Price Range: $789.99 - $829.99"));
        assert!(reply.text.contains("🏪 Available at: 5 retailers"));
        let min = reply.rows[0]["min_price"].as_f64().unwrap();
        let avg = reply.rows[0]["avg_price"].as_f64().unwrap();
        let max = reply.rows[0]["max_price"].as_f64().unwrap();
        assert!(min <= avg && avg <= max);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found_reply() {
        let (db, _dir) = seeded_db().await;
        let reply = ProductsAgent.handle("find unicorn saddles", &deps(db, None)).await.unwrap();

        assert_eq!(reply.row_count, 0);
        assert!(reply.text.contains("couldn't find any products matching \"unicorn saddle\""));
    }

    #[tokio::test]
    async fn test_stock_and_location_phrasing_lists_catalog() {
        let (db, _dir) = seeded_db().await;
        for utterance in ["show me what's in stock", "Show me retailers in New York"] {
            let reply = ProductsAgent.handle(utterance, &deps(db.clone(), None)).await.unwrap();
            assert_eq!(reply.row_count, 8, "{}", utterance);
            assert!(!reply.text.contains("couldn't find"), "{}", utterance);
        }
    }

    #[tokio::test]
    async fn test_listing_groups_categories() {
        let (db, _dir) = seeded_db().await;
        let reply = ProductsAgent.handle("What products are available?", &deps(db, None)).await.unwrap();

        assert_eq!(reply.row_count, 8);
        assert!(reply.text.starts_with("🛍️ **Available Products:**"));
        assert!(reply.text.contains("**Home Goods:**\n• Coffee Maker\n• Desk Chair"));
    }

    #[tokio::test]
    async fn test_commentary_failure_keeps_rows() {
        let (db, _dir) = seeded_db().await;
        let llm = Arc::new(FakeLlm::new(FakeReply::RateLimit));
        let reply = ProductsAgent.handle("show me electronics", &deps(db, Some(llm.clone()))).await.unwrap();

        assert_eq!(reply.row_count, 4);
        assert_eq!(llm.prompts().len(), 1);
        assert!(!reply.text.contains("429"));
    }
}

use crate::agents::terms;
use crate::agents::{Agent, AgentDeps, AgentKind, AgentReply};
use crate::catalog::{queries, OfferOrder, ProductFilter};
use crate::error::Result;
use crate::format;
use async_trait::async_trait;

const KEYWORDS: &[&str] = &[
    "retailer",
    "retailers",
    "store",
    "stores",
    "shop",
    "shops",
    "where to buy",
    "who sells",
    "stock",
    "availability",
    "in stock",
    "store location",
    "buy from",
    "purchase from",
];

const CAPABILITIES: &[&str] = &[
    "Find retailers by product",
    "Check stock availability",
    "Store information and locations",
    "Retailer comparisons",
    "Purchase recommendations",
];

const BROAD_LIMIT: usize = 10;

/// Filter, ordering and limit for one utterance
fn select_query(lower: &str) -> (ProductFilter, OfferOrder, Option<usize>) {
    if let Some(name) = terms::named_product(lower) {
        return (ProductFilter::NameLike(name.to_string()), OfferOrder::PriceAscending, None);
    }
    if let Some(category) = terms::named_category(lower) {
        return (ProductFilter::Category(category.to_string()), OfferOrder::PriceAscending, None);
    }
    if lower.contains("cheapest") || lower.contains("lowest price") {
        return (ProductFilter::All, OfferOrder::PriceAscending, Some(BROAD_LIMIT));
    }
    if let Some(term) = terms::search_term(lower) {
        return (ProductFilter::Text(term), OfferOrder::PriceAscending, None);
    }
    (ProductFilter::All, OfferOrder::TopRated, Some(BROAD_LIMIT))
}

pub struct RetailersAgent;

#[async_trait]
impl Agent for RetailersAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Retailers
    }

    fn specialization(&self) -> &'static str {
        "Store locations, stock levels, and retailer information"
    }

    fn keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn capabilities(&self) -> &'static [&'static str] {
        CAPABILITIES
    }

    fn probe_utterance(&self) -> &'static str {
        "show me retailers"
    }

    async fn handle(&self, utterance: &str, deps: &AgentDeps) -> Result<AgentReply> {
        let kind = self.kind();
        log::info!("{} Processing query: {}", kind.log_prefix(), utterance);
        let (filter, order, limit) = select_query(&utterance.to_lowercase());

        let rows = queries::retailer_offers(&deps.db, &filter, order, limit).await?;
        log::info!("{} {} listings for {}", kind.log_prefix(), rows.len(), filter.describe());

        // A free-text term nobody sells falls back to the top-rated listings
        let (rows, note) = match filter {
            ProductFilter::Text(_) if rows.is_empty() => {
                let top = queries::retailer_offers(&deps.db, &ProductFilter::All, OfferOrder::TopRated, Some(BROAD_LIMIT))
                    .await?;
                (top, Some(format::retailers_fallback_note(&filter.describe())))
            }
            _ => (rows, None),
        };

        if rows.is_empty() {
            return Ok(AgentReply::new(kind, format::retailers_not_found(&filter.describe()), &rows));
        }

        let prompt_rows = rows.iter().map(format::offer_prompt_row).collect();
        let commentary = deps.commentary(kind, utterance, prompt_rows).await;
        let mut text = note.unwrap_or_default();
        text.push_str(&format::format_retailer_offers(&rows, commentary.as_deref()));
        Ok(AgentReply::new(kind, text, &rows))
    }
}

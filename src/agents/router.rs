//! Weighted keyword routing.
//!
//! An agent's score is the sum of word counts of its keywords found in the
//! lower-cased utterance. A hit lying inside a longer hit of the same agent
//! is not counted, so "smartphones" scores `smartphone` once and not `phone`
//! again. Highest score wins; ties go to the lowest `AgentKind::priority`.

use crate::agents::{Agent, AgentKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// One agent scored strictly highest
    High,
    /// Several agents shared the top score; priority decided
    TieBreak,
    /// No keyword matched
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDecision {
    pub agent: Option<AgentKind>,
    pub confidence: Confidence,
    pub scores: Vec<(AgentKind, u32)>,
}

pub struct Router {
    table: Vec<(AgentKind, &'static [&'static str])>,
}

impl Router {
    pub fn new(agents: &[Box<dyn Agent>]) -> Self {
        Self {
            table: agents.iter().map(|a| (a.kind(), a.keywords())).collect(),
        }
    }

    pub fn route(&self, utterance: &str) -> RouteDecision {
        let lower = utterance.to_lowercase();
        let scores: Vec<(AgentKind, u32)> = self
            .table
            .iter()
            .map(|(kind, keywords)| (*kind, score(&lower, keywords)))
            .collect();
        for (kind, s) in &scores {
            log::debug!("[Router] {} score: {}", kind.id(), s);
        }

        let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
        if best == 0 {
            return RouteDecision {
                agent: None,
                confidence: Confidence::None,
                scores,
            };
        }

        let mut leaders: Vec<AgentKind> = scores.iter().filter(|(_, s)| *s == best).map(|(k, _)| *k).collect();
        leaders.sort_by_key(|k| k.priority());
        let confidence = if leaders.len() == 1 {
            Confidence::High
        } else {
            Confidence::TieBreak
        };

        RouteDecision {
            agent: leaders.first().copied(),
            confidence,
            scores,
        }
    }
}

fn weight(keyword: &str) -> u32 {
    keyword.split_whitespace().count() as u32
}

/// Score one agent's keywords against an already lower-cased utterance
pub fn score(lower: &str, keywords: &[&str]) -> u32 {
    let hits: Vec<(usize, usize, &str)> = keywords
        .iter()
        .flat_map(|kw| lower.match_indices(*kw).map(move |(pos, _)| (pos, pos + kw.len(), *kw)))
        .collect();

    let standalone = |start: usize, end: usize, kw: &str| {
        !hits
            .iter()
            .any(|(o_start, o_end, other)| other.len() > kw.len() && *o_start <= start && end <= *o_end)
    };

    keywords
        .iter()
        .filter(|kw| {
            hits.iter()
                .filter(|(_, _, hit)| hit == *kw)
                .any(|(start, end, hit)| standalone(*start, *end, hit))
        })
        .map(|kw| weight(kw))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{CategoriesAgent, ProductsAgent, RetailersAgent};

    fn router() -> Router {
        let agents: Vec<Box<dyn Agent>> = vec![
            Box::new(CategoriesAgent),
            Box::new(ProductsAgent),
            Box::new(RetailersAgent),
        ];
        Router::new(&agents)
    }

    fn score_of(decision: &RouteDecision, kind: AgentKind) -> u32 {
        decision.scores.iter().find(|(k, _)| *k == kind).map(|(_, s)| *s).unwrap_or(0)
    }

    #[test]
    fn test_who_sells_smartphones_goes_to_retailers() {
        let decision = router().route("Who sells smartphones?");
        assert_eq!(score_of(&decision, AgentKind::Retailers), 2);
        assert_eq!(score_of(&decision, AgentKind::Products), 1);
        assert_eq!(decision.agent, Some(AgentKind::Retailers));
        assert_eq!(decision.confidence, Confidence::High);
    }

    #[test]
    fn test_products_outscore_categories() {
        let decision = router().route("What products are available?");
        assert_eq!(decision.agent, Some(AgentKind::Products));
    }

    #[test]
    fn test_categories_phrase() {
        let decision = router().route("What do you have?");
        assert_eq!(score_of(&decision, AgentKind::Categories), 4);
        assert_eq!(decision.agent, Some(AgentKind::Categories));
    }

    #[test]
    fn test_tie_goes_to_priority() {
        // "store" (retailers, 1) vs "book" (products, 1) vs "category" (categories, 1)
        let decision = router().route("book category store");
        assert_eq!(decision.agent, Some(AgentKind::Products));
        assert_eq!(decision.confidence, Confidence::TieBreak);

        let decision = router().route("category store");
        assert_eq!(decision.agent, Some(AgentKind::Retailers));
    }

    #[test]
    fn test_no_match() {
        let decision = router().route("Recommend something for my dad");
        assert_eq!(decision.agent, None);
        assert_eq!(decision.confidence, Confidence::None);
    }

    #[test]
    fn test_routing_is_deterministic() {
        let r = router();
        for utterance in ["cheapest laptop in stock", "browse books", "hello"] {
            assert_eq!(r.route(utterance), r.route(utterance));
        }
    }

    #[test]
    fn test_subsumed_hits_not_double_counted() {
        assert_eq!(score("in stock", &["stock", "in stock"]), 2);
        assert_eq!(score("stock and in stock", &["stock", "in stock"]), 3);
        assert_eq!(score("products", &["product", "products"]), 1);
        assert_eq!(score("headphones", &["phone", "headphone"]), 1);
    }
}

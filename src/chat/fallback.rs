//! Answers for utterances no agent claimed: canned replies for small talk,
//! otherwise vector retrieval plus a model completion.

use crate::chat::ChatReply;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::llm::{prompts, CompletionRequest, LlmClient};
use crate::search::VectorStore;
use std::sync::Arc;

/// Checked in order; the first phrase found as whole words wins
const SIMPLE_REPLIES: &[(&str, &str)] = &[
    (
        "hi",
        "Hello! I'm your shopping assistant and I can help you with product searches. You can ask me:\n• 'What products are available?'\n• 'Show me laptops'\n• 'Smartphone prices'",
    ),
    ("hello", "Hello! I'm your shopping assistant. How can I help you today?"),
    (
        "help",
        "I can help you with:\n• Product search\n• Price information\n• Category-wise products\n• Retailer information\n• Product recommendations",
    ),
    ("thanks", "You're welcome! 😊 Is there anything else you'd like to know?"),
    ("thank you", "I'm happy to help! 😊 Feel free to ask more questions."),
];

/// Longer messages are real questions even if they start with "hi"
const SIMPLE_MAX_WORDS: usize = 5;

pub const NO_MATCH_REPLY: &str = "I didn't quite understand that. Please try asking something specific like:\n• 'Show me products'\n• 'Laptop prices'\n• 'What categories are available?'\n• 'Show me electronics'";

pub struct Fallback {
    vector_store: VectorStore,
    llm: Arc<dyn LlmClient>,
    search: SearchConfig,
    temperature: f32,
    max_tokens: u32,
}

impl Fallback {
    pub fn new(
        vector_store: VectorStore,
        llm: Arc<dyn LlmClient>,
        search: SearchConfig,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            vector_store,
            llm,
            search,
            temperature,
            max_tokens,
        }
    }

    pub async fn answer(&self, message: &str) -> Result<ChatReply> {
        if let Some(reply) = simple_reply(message) {
            log::info!("[Simple Response] Returning pre-defined response");
            return Ok(ChatReply::new(reply, "simple"));
        }

        log::info!("[Vector] Retrieving documents for query: {}", message);
        let matches = self
            .vector_store
            .search(message, self.search.default_k, self.search.min_score)
            .await?;
        log::info!("[Vector] Retrieved {} documents", matches.len());

        if matches.is_empty() {
            log::info!("[Fallback] No relevant documents, returning generic help message");
            return Ok(ChatReply::new(NO_MATCH_REPLY, "fallback"));
        }
        for m in &matches {
            log::debug!("[Vector] #{} {} (score {:.3})", m.rank, m.metadata.name, m.score);
        }

        let context = matches
            .iter()
            .take(self.search.context_docs)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let request = CompletionRequest::from_prompt(
            prompts::fallback_answer(message, &context),
            self.temperature,
            self.max_tokens,
        );
        let answer = self.llm.complete(request).await?;
        Ok(ChatReply::new(answer, "vector"))
    }
}

/// Canned reply for short small-talk messages
pub fn simple_reply(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() || words.len() > SIMPLE_MAX_WORDS {
        return None;
    }

    SIMPLE_REPLIES
        .iter()
        .find(|(phrase, _)| {
            let needle: Vec<&str> = phrase.split(' ').collect();
            words.windows(needle.len()).any(|w| w == needle.as_slice())
        })
        .map(|(_, reply)| *reply)
}

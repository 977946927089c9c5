//! Shared fixtures for unit tests: throwaway databases and in-process
//! stand-ins for the embedding and chat APIs.

use crate::catalog::seed_catalog;
use crate::db::{migrate, Db};
use crate::embeddings::Embedder;
use crate::error::{Result, ShopbotError};
use crate::llm::{CompletionRequest, LlmClient};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

pub const FAKE_DIMENSIONS: usize = 64;

/// Fresh database with every migration applied
pub async fn migrated_db() -> (Db, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Db::new(temp_dir.path().join("test.db"));
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
        .await
        .unwrap();
    (db, temp_dir)
}

/// Migrated database holding the demo catalog (vector documents not embedded)
pub async fn seeded_db() -> (Db, TempDir) {
    let (db, temp_dir) = migrated_db().await;
    seed_catalog(&db, false).await.unwrap();
    (db, temp_dir)
}

/// Bag-of-words hashing embedder: texts sharing words score higher
#[derive(Default)]
pub struct FakeEmbedder;

impl FakeEmbedder {
    fn vectorize(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; FAKE_DIMENSIONS];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
        {
            // FNV-1a
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in word.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            v[(hash % FAKE_DIMENSIONS as u64) as usize] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(&text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        FAKE_DIMENSIONS
    }
}

/// What the fake chat model does with every call
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Fail,
    RateLimit,
}

/// Scripted chat model that records the prompts it was sent
pub struct FakeLlm {
    reply: FakeReply,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self::new(FakeReply::Text(text.to_string()))
    }

    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        match &self.reply {
            FakeReply::Text(text) => Ok(text.clone()),
            FakeReply::Fail => Err(ShopbotError::Llm("model unavailable".to_string())),
            FakeReply::RateLimit => Err(ShopbotError::RateLimited("429 Too Many Requests".to_string())),
        }
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

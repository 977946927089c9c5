pub mod agents;
pub mod cache;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod format;
pub mod http;
pub mod llm;
pub mod search;

#[cfg(test)]
mod test_support;

pub use chat::{ChatReply, ChatService};
pub use config::Config;
pub use error::{Result, ShopbotError};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub shopbot: ShopbotConfig,
    pub llm: LlmConfig,
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Storage and process settings
#[derive(Debug, Clone, Deserialize)]
pub struct ShopbotConfig {
    /// SQLite file holding the catalog and the product vector table.
    pub db_path: PathBuf,
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Hosted chat-completion model (OpenAI-compatible wire format)
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    /// Temperature for fallback answers.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Temperature for agent commentary; lower keeps it on the rows.
    #[serde(default = "default_agent_temperature")]
    pub agent_temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Retries on HTTP 429 before giving up with a rate-limit error.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Embeddings configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_embeddings_base_url")]
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub dimensions: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

/// Fallback retrieval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Nearest neighbours fetched from the vector store.
    #[serde(default = "default_k")]
    pub default_k: usize,
    /// How many of those neighbours go into the LLM context.
    #[serde(default = "default_context_docs")]
    pub context_docs: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            context_docs: default_context_docs(),
            min_score: default_min_score(),
        }
    }
}

/// Agent behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct AgentsConfig {
    /// Ask the LLM for a short commentary under each agent reply.
    #[serde(default = "default_llm_commentary")]
    pub llm_commentary: bool,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            llm_commentary: default_llm_commentary(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_http_port(),
            allowed_origins: default_allowed_origins(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_base_url() -> String {
    "https://integrate.api.nvidia.com/v1".to_string()
}

fn default_llm_model() -> String {
    "mistralai/mixtral-8x22b-instruct-v0.1".to_string()
}

fn default_llm_api_key_env() -> String {
    "NVIDIA_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_agent_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_retries() -> usize {
    2
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_embeddings_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_k() -> usize {
    3
}

fn default_context_docs() -> usize {
    2
}

fn default_min_score() -> f32 {
    0.0
}

fn default_llm_commentary() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    // Empty means any origin; the demo frontend runs on a different port.
    vec![]
}

fn default_max_message_chars() -> usize {
    2000
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in SHOPBOT_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("SHOPBOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml_str(&config_str)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.search.default_k == 0 {
            anyhow::bail!("search.default_k must be greater than 0");
        }

        if self.search.context_docs == 0 || self.search.context_docs > self.search.default_k {
            anyhow::bail!("search.context_docs must be between 1 and search.default_k");
        }

        if self.search.min_score < 0.0 || self.search.min_score > 1.0 {
            anyhow::bail!("search.min_score must be between 0.0 and 1.0");
        }

        for (name, value) in [
            ("llm.temperature", self.llm.temperature),
            ("llm.agent_temperature", self.llm.agent_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                anyhow::bail!("{} must be between 0.0 and 2.0", name);
            }
        }

        if self.llm.max_tokens == 0 {
            anyhow::bail!("llm.max_tokens must be greater than 0");
        }

        if self.embeddings.dimensions == 0 {
            anyhow::bail!("embeddings.dimensions must be greater than 0");
        }

        if self.embeddings.batch_size == 0 {
            anyhow::bail!("embeddings.batch_size must be greater than 0");
        }

        if self.http_server.max_message_chars == 0 {
            anyhow::bail!("http_server.max_message_chars must be greater than 0");
        }

        Ok(())
    }

    /// API key for the chat-completion model
    pub fn llm_api_key(&self) -> Result<String> {
        read_api_key(&self.llm.api_key_env)
    }

    /// API key for the embeddings endpoint
    pub fn embeddings_api_key(&self) -> Result<String> {
        read_api_key(&self.embeddings.api_key_env)
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.shopbot.db_path
    }

    /// Get migrations directory
    pub fn migrations_dir(&self) -> &Path {
        &self.shopbot.migrations_dir
    }
}

fn read_api_key(env_name: &str) -> Result<String> {
    let key = std::env::var(env_name).with_context(|| {
        format!(
            "Environment variable {} not set. Set it in your .env file or as an environment variable.",
            env_name
        )
    })?;
    if key.trim().is_empty() {
        anyhow::bail!("Environment variable {} is empty", env_name);
    }
    Ok(key)
}

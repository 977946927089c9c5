use thiserror::Error;

/// Main error type for Shopbot
#[derive(Error, Debug)]
pub enum ShopbotError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding API errors
    #[error("Embedding API error: {0}")]
    Embedding(String),

    /// Chat completion API errors (non rate-limit)
    #[error("LLM API error: {0}")]
    Llm(String),

    /// The hosted model rejected the call with HTTP 429 after all retries
    #[error("LLM rate limit exceeded: {0}")]
    RateLimited(String),

    /// Vector store errors (missing index, bad blobs, dimension mismatch)
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog entity not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ShopbotError {
    /// Source tag reported to chat clients when this error reaches the request boundary.
    pub fn source_tag(&self) -> &'static str {
        match self {
            ShopbotError::RateLimited(_) => "rate_limit",
            _ => "error",
        }
    }
}

/// Convenient Result type using ShopbotError
pub type Result<T> = std::result::Result<T, ShopbotError>;

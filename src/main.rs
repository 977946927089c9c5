use anyhow::Result;
use shopbot::cache::EmbeddingCache;
use shopbot::catalog::queries;
use shopbot::db::{migrate, Db};
use shopbot::embeddings::{count_embedded, OpenAIEmbedder};
use shopbot::llm::ChatCompletionsClient;
use shopbot::{ChatService, Config, ShopbotError};
use std::sync::Arc;

/// Build the query embedder, wrapped in an LRU cache when capacity > 0
fn build_embedder(config: &Config) -> Result<(OpenAIEmbedder, Option<Arc<EmbeddingCache>>)> {
    let api_key = config.embeddings_api_key()?;
    let cache = if config.embeddings.cache_capacity > 0 {
        Some(Arc::new(EmbeddingCache::new(config.embeddings.cache_capacity)))
    } else {
        None
    };
    let embedder = OpenAIEmbedder::new_with_cache(&config.embeddings, api_key, cache.clone())?;
    Ok((embedder, cache))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.shopbot.log_level.as_str()),
    )
    .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    match command {
        "serve" => run_server(config).await?,
        "verify" => run_verification(config).await?,
        other => anyhow::bail!("Unknown command '{}'. Usage: shopbot [serve|verify]", other),
    }

    Ok(())
}

async fn migrate_db(config: &Config) -> Result<Db> {
    let db = Db::new(config.db_path());
    let migrations_dir = config.migrations_dir().to_path_buf();
    db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
        .await?;
    Ok(db)
}

/// Run the chat HTTP server
async fn run_server(config: Config) -> Result<()> {
    log::info!("Starting Shopbot v{}", env!("CARGO_PKG_VERSION"));

    let db = migrate_db(&config).await?;
    if queries::category_count(&db).await? == 0 {
        log::warn!("Catalog is empty; run the seed binary before chatting");
    }
    let (embedded, total) = count_embedded(&db).await?;
    if embedded < total {
        log::warn!("{} of {} product documents have no embedding; run seed", total - embedded, total);
    }

    let (embedder, cache) = build_embedder(&config)?;
    let llm = ChatCompletionsClient::new(&config.llm, config.llm_api_key()?)?;
    log::info!(
        "Models: chat={} embeddings={} ({} dims)",
        config.llm.model,
        config.embeddings.model,
        config.embeddings.dimensions
    );

    let service = ChatService::new(&config, db, Arc::new(embedder), Arc::new(llm)).with_embedding_cache(cache);
    shopbot::http::run(&config.http_server, Arc::new(service)).await?;

    Ok(())
}

/// Check schema, pragmas and seed state
async fn run_verification(config: Config) -> Result<()> {
    log::info!("Verifying Shopbot database v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Database path: {}", config.db_path().display());
    log::info!("Embedding model: {}", config.embeddings.model);

    let db = migrate_db(&config).await?;
    db.ping().await?;

    db.with_connection(|conn| {
        let missing = migrate::missing_tables(conn)?;
        if !missing.is_empty() {
            return Err(ShopbotError::Config(format!("Missing tables: {}", missing.join(", "))));
        }
        log::debug!("✓ All required tables exist");

        let applied = migrate::get_applied_migrations(conn)?;
        log::debug!("✓ {} migrations applied", applied.len());

        let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            return Err(ShopbotError::Config(format!("Journal mode is not WAL: {}", journal_mode)));
        }
        log::debug!("✓ Journal mode: WAL");

        let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        if foreign_keys != 1 {
            return Err(ShopbotError::Config("Foreign keys not enabled".to_string()));
        }
        log::debug!("✓ Foreign keys enabled");

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(ShopbotError::Config(format!("Database integrity check failed: {}", integrity)));
        }
        log::info!("✓ Database integrity: OK");
        Ok(())
    })
    .await?;

    let categories = queries::category_count(&db).await?;
    if categories == 0 {
        log::warn!("Catalog is empty; run the seed binary");
    } else {
        log::info!("✓ Catalog seeded ({} categories)", categories);
    }

    let (embedded, total) = count_embedded(&db).await?;
    if embedded < total || total == 0 {
        log::warn!("Vector store: {}/{} product documents embedded", embedded, total);
    } else {
        log::info!("✓ Vector store: {}/{} product documents embedded", embedded, total);
    }

    log::info!("✓ Database verification complete");
    Ok(())
}

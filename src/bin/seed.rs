use anyhow::Result;
use clap::Parser;
use shopbot::catalog::seed_catalog;
use shopbot::db::{migrate, Db};
use shopbot::embeddings::{count_embedded, documents_without_embedding, store_embeddings_batch, Embedder, OpenAIEmbedder};
use shopbot::Config;

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Create the demo catalog and embed its product documents (incremental: only documents without embeddings)")]
struct Args {
    /// Delete the existing catalog and vector documents first
    #[arg(short, long)]
    reset: bool,

    /// Write the catalog only; embed later by running seed again
    #[arg(long)]
    skip_embeddings: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.shopbot.log_level.as_str()),
    )
    .init();

    log::info!("Starting Shopbot catalog seeding");
    log::info!("Database path: {}", config.db_path().display());

    let db = Db::new(config.db_path());
    let migrations_dir = config.migrations_dir().to_path_buf();
    db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
        .await?;

    let summary = seed_catalog(&db, args.reset).await?;
    if summary.skipped {
        log::info!("Catalog left as is (use --reset to recreate it)");
    }

    if args.skip_embeddings {
        let (embedded, total) = count_embedded(&db).await?;
        log::info!("Skipping embeddings ({}/{} documents embedded)", embedded, total);
        return Ok(());
    }

    embed_pending(&config, &db).await
}

/// Embed every vector document that has no embedding yet
async fn embed_pending(config: &Config, db: &Db) -> Result<()> {
    let pending = documents_without_embedding(db).await?;
    let total = pending.len();
    if total == 0 {
        log::info!("No documents need embedding. All documents already have embeddings.");
        return Ok(());
    }

    let embedder = OpenAIEmbedder::new(&config.embeddings, config.embeddings_api_key()?)?;
    log::info!(
        "Embedding {} documents: model={}, dimensions={}, batch_size={}",
        total,
        config.embeddings.model,
        config.embeddings.dimensions,
        config.embeddings.batch_size
    );

    let mut completed = 0;
    let mut failed = 0;

    for batch in pending.chunks(config.embeddings.batch_size) {
        let texts: Vec<String> = batch.iter().map(|(_, content)| content.clone()).collect();

        match embedder.embed_batch(texts).await {
            Ok(vectors) => {
                let rows = batch.iter().map(|(id, _)| *id).zip(vectors).collect();
                let stored = store_embeddings_batch(db, rows).await?;
                completed += stored;
                failed += batch.len() - stored;
                log::info!(
                    "Embedding progress: {}/{} documents ({:.1}%)",
                    completed,
                    total,
                    completed as f64 / total as f64 * 100.0
                );
            }
            Err(e) => {
                failed += batch.len();
                log::error!("Failed to generate embeddings for batch: {}", e);
                log::warn!("Continuing with next batch...");
            }
        }
    }

    log::info!("Embedding generation complete!");
    log::info!("Successfully embedded: {} documents", completed);
    if failed > 0 {
        log::warn!("Failed to embed: {} documents; run seed again to retry", failed);
    }

    Ok(())
}

use crate::db::Db;
use crate::embeddings::encode_embedding;
use crate::error::Result;
use rusqlite::params;

/// Store many embeddings in one transaction. Returns how many rows were updated.
pub async fn store_embeddings_batch(db: &Db, embeddings: Vec<(i64, Vec<f32>)>) -> Result<usize> {
    if embeddings.is_empty() {
        return Ok(0);
    }

    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        let mut success_count = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE product_vectors SET embedding = ?1, embedded_at = datetime('now') WHERE product_id = ?2",
            )?;
            for (product_id, embedding) in &embeddings {
                match stmt.execute(params![encode_embedding(embedding), product_id]) {
                    Ok(0) => log::warn!("No vector document for product {}", product_id),
                    Ok(_) => success_count += 1,
                    Err(e) => log::warn!("Failed to store embedding for product {}: {}", product_id, e),
                }
            }
        }
        tx.commit()?;
        Ok(success_count)
    })
    .await
}

/// (product_id, content) for every vector document still waiting for an embedding
pub async fn documents_without_embedding(db: &Db) -> Result<Vec<(i64, String)>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            "SELECT product_id, content FROM product_vectors WHERE embedding IS NULL ORDER BY product_id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    })
    .await
}

/// (embedded, total) vector document counts
pub async fn count_embedded(db: &Db) -> Result<(i64, i64)> {
    db.with_connection(|conn| {
        let counts = conn.query_row(
            "SELECT COUNT(embedding), COUNT(*) FROM product_vectors",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok(counts)
    })
    .await
}

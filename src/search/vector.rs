use crate::catalog::ProductMetadata;
use crate::db::Db;
use crate::embeddings::{decode_embedding, Embedder};
use crate::error::{Result, ShopbotError};
use serde::Serialize;
use std::sync::Arc;

/// One product document ranked by similarity to a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductMatch {
    pub product_id: i64,
    pub content: String,
    pub metadata: ProductMetadata,
    pub score: f32,
    /// 1-based position in the result list
    pub rank: usize,
}

/// Nearest-neighbour search over the `product_vectors` table.
///
/// The catalog is small, so every search is a full scan scored in Rust.
#[derive(Clone)]
pub struct VectorStore {
    db: Db,
    embedder: Arc<dyn Embedder>,
}

impl VectorStore {
    pub fn new(db: Db, embedder: Arc<dyn Embedder>) -> Self {
        Self { db, embedder }
    }

    /// Embed `query` and return the top `k` documents scoring at least `min_score`
    pub async fn search(&self, query: &str, k: usize, min_score: f32) -> Result<Vec<ProductMatch>> {
        let embed_start = std::time::Instant::now();
        let query_vec = self.embedder.embed(query).await?;
        log::debug!("Vector search: query embedding took {:?}", embed_start.elapsed());

        let expected = self.embedder.dimensions();
        if query_vec.len() != expected {
            return Err(ShopbotError::Embedding(format!(
                "Unexpected embedding dimension: expected {}, got {}",
                expected,
                query_vec.len()
            )));
        }

        self.search_by_vector(query_vec, k, min_score).await
    }

    /// Score every embedded document against an already computed query vector
    pub async fn search_by_vector(&self, query_vec: Vec<f32>, k: usize, min_score: f32) -> Result<Vec<ProductMatch>> {
        let rows = self
            .db
            .with_connection(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT product_id, content, metadata_json, embedding \
                     FROM product_vectors WHERE embedding IS NOT NULL",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Vec<u8>>(3)?,
                        ))
                    })?
                    .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await?;

        let mut scored: Vec<ProductMatch> = Vec::new();
        for (product_id, content, metadata_json, blob) in rows {
            let embedding = match decode_embedding(&blob) {
                Some(e) if e.len() == query_vec.len() => e,
                _ => {
                    log::warn!("Skipping product {}: embedding does not match query dimension", product_id);
                    continue;
                }
            };
            let score = cosine_similarity(&query_vec, &embedding);
            if score < min_score {
                continue;
            }
            let metadata: ProductMetadata = serde_json::from_str(&metadata_json).map_err(|e| {
                ShopbotError::VectorStore(format!("Bad metadata for product {}: {}", product_id, e))
            })?;
            scored.push(ProductMatch {
                product_id,
                content,
                metadata,
                score,
                rank: 0,
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.product_id.cmp(&b.product_id))
        });
        let results = scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(idx, mut m)| {
                m.rank = idx + 1;
                m
            })
            .collect();
        Ok(results)
    }

    /// Number of documents that can take part in a search
    pub async fn embedded_count(&self) -> Result<i64> {
        let (embedded, _) = crate::embeddings::count_embedded(&self.db).await?;
        Ok(embedded)
    }
}

/// Cosine similarity in [-1, 1]; 0.0 when lengths differ or either vector is zero
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

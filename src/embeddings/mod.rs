pub mod openai;
pub mod storage;

use crate::error::Result;
use async_trait::async_trait;

pub use openai::OpenAIEmbedder;
pub use storage::{count_embedded, documents_without_embedding, store_embeddings_batch};

/// Turns text into fixed-length vectors.
///
/// The HTTP client implements this for production; tests swap in a
/// deterministic in-process embedder.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one query, consulting the query cache when one is attached
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many documents, preserving input order
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Vector length every returned embedding has
    fn dimensions(&self) -> usize;
}

/// Little-endian f32 BLOB encoding shared by storage and search
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Inverse of [`encode_embedding`]; `None` when the blob length is not a multiple of 4
pub fn decode_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }
    blob.chunks(4)
        .map(|bytes| {
            let arr: [u8; 4] = bytes.try_into().ok()?;
            Some(f32::from_le_bytes(arr))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_embedding_valid() {
        let floats = vec![1.0f32, -2.5, 3.25, 0.0];
        let decoded = decode_embedding(&encode_embedding(&floats)).unwrap();
        assert_eq!(decoded, floats);
    }

    #[test]
    fn test_decode_embedding_invalid_length() {
        assert!(decode_embedding(&[0u8, 1, 2, 3, 4]).is_none());
    }

    #[test]
    fn test_decode_embedding_empty() {
        assert_eq!(decode_embedding(&[]), Some(Vec::new()));
    }
}

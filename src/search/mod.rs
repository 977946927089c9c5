pub mod vector;

pub use vector::{cosine_similarity, ProductMatch, VectorStore};

//! Vector index for document chunks.
//!
//! The index only ever holds the most recently ingested document: building
//! it replaces whatever was there before.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::{SqliteVectorStore, DATABASE_FILE};

use crate::chunking::DocumentChunk;
use crate::config::{IndexProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A chunk stored in the index together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: Uuid,
    pub chunk: DocumentChunk,
    pub embedding: Vec<f32>,
    /// Position of the chunk in its document.
    pub chunk_order: i32,
    pub indexed_at: DateTime<Utc>,
}

impl IndexEntry {
    pub fn new(chunk: DocumentChunk, embedding: Vec<f32>, chunk_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            chunk,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched entry.
    pub entry: IndexEntry,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Drop all previous content and store `entries`.
    async fn replace_all(&self, entries: Vec<IndexEntry>) -> Result<usize>;

    /// Up to `limit` entries scoring at least `min_score`, best first.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize>;
}

/// Open the index backend selected in settings.
pub fn create_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match settings.index.provider {
        IndexProvider::Memory => Arc::new(MemoryVectorStore::new()),
        IndexProvider::Sqlite => Arc::new(SqliteVectorStore::open(&settings.index_dir())?),
    };
    Ok(store)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Sort by descending score, ties by document order, then cut to `limit`.
pub(crate) fn rank(mut results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.entry.chunk_order.cmp(&b.entry.chunk_order))
    });
    results.truncate(limit);
    results
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_breaks_ties_by_order() {
        let results = vec![
            SearchResult { entry: test_support::entry("b", None, vec![], 1), score: 0.5 },
            SearchResult { entry: test_support::entry("a", None, vec![], 0), score: 0.5 },
            SearchResult { entry: test_support::entry("c", None, vec![], 2), score: 0.9 },
        ];

        let ranked = rank(results, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entry.chunk.text, "c");
        assert_eq!(ranked[1].entry.chunk.text, "a");
    }
}

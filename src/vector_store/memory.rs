//! In-memory vector store implementation.
//!
//! Useful for testing and for one-off sessions that need no index on disk.

use super::{cosine_similarity, rank, IndexEntry, SearchResult, VectorStore};
use crate::error::{QuizError, Result};
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    entries: RwLock<Vec<IndexEntry>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: T) -> QuizError
where
    T: std::fmt::Display,
{
    QuizError::VectorStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn replace_all(&self, entries: Vec<IndexEntry>) -> Result<usize> {
        let mut store = self.entries.write().map_err(poisoned)?;
        *store = entries;
        Ok(store.len())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().map_err(poisoned)?;

        let results: Vec<SearchResult> = entries
            .iter()
            .map(|entry| SearchResult {
                score: cosine_similarity(query_embedding, &entry.embedding),
                entry: entry.clone(),
            })
            .filter(|r| r.score >= min_score)
            .collect();

        Ok(rank(results, limit))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }
}

//! Building and querying the chunk index.

use crate::chunking::DocumentChunk;
use crate::embedding::Embedder;
use crate::error::{QuizError, Result};
use crate::vector_store::{IndexEntry, SearchResult, VectorStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A chunk returned by retrieval, with its similarity to the query.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

impl From<SearchResult> for RetrievedChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            chunk: result.entry.chunk,
            score: result.score,
        }
    }
}

/// Embeds chunks into the vector store and retrieves them by topic.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    min_score: f32,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            min_score: 0.2,
        }
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Replace the index contents with `chunks`.
    #[instrument(skip_all, fields(count = chunks.len()))]
    pub async fn index(&self, chunks: Vec<DocumentChunk>) -> Result<usize> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(QuizError::Embedding(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(order, (chunk, embedding))| IndexEntry::new(chunk, embedding, order as i32))
            .collect();

        let stored = self.vector_store.replace_all(entries).await?;
        info!("Index rebuilt with {} chunks", stored);
        Ok(stored)
    }

    /// Up to `k` chunks relevant to `topic`, most relevant first.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, topic: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(topic).await?;

        let results = self
            .vector_store
            .search(&query_embedding, k, self.min_score)
            .await?;

        debug!("Retrieved {} chunks", results.len());
        Ok(results.into_iter().map(RetrievedChunk::from).collect())
    }

    /// Number of chunks currently indexed.
    pub async fn indexed_count(&self) -> Result<usize> {
        self.vector_store.count().await
    }
}

/// Chunk texts joined by blank lines, as inserted into the prompt.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format retrieved chunks for display to the user.
pub fn format_context_for_display(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "[{}] {} (score: {:.2})\n{}",
                i + 1,
                c.chunk.metadata.location(),
                c.score,
                c.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::SourceMetadata;
    use crate::embedding::HashEmbedder;
    use crate::ingestion::SourceKind;
    use crate::vector_store::MemoryVectorStore;

    fn chunk(text: &str, page: u32) -> DocumentChunk {
        DocumentChunk::new(
            text.to_string(),
            SourceMetadata {
                source_id: "notes.pdf".to_string(),
                kind: SourceKind::Pdf,
                page: Some(page),
            },
        )
    }

    fn builder() -> ContextBuilder {
        ContextBuilder::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(HashEmbedder::new(1024)),
        )
    }

    #[tokio::test]
    async fn test_index_then_retrieve() {
        let builder = builder();
        let indexed = builder
            .index(vec![
                chunk("Mitochondria produce ATP through respiration.", 2),
                chunk("The French revolution began in 1789.", 5),
                chunk("ATP stores energy for the cell.", 3),
            ])
            .await
            .unwrap();
        assert_eq!(indexed, 3);

        let retrieved = builder.retrieve("mitochondria ATP", 2).await.unwrap();
        assert_eq!(retrieved.len(), 2);
        assert_eq!(retrieved[0].chunk.metadata.page, Some(2));
        assert!(retrieved[0].score >= retrieved[1].score);

        let context = format_context(&retrieved);
        assert!(context.contains("\n\n"));
        assert!(context.starts_with("Mitochondria produce ATP"));
    }

    #[tokio::test]
    async fn test_retrieve_from_empty_index() {
        let builder = builder();
        assert!(builder.retrieve("anything", 2).await.unwrap().is_empty());
        assert_eq!(builder.indexed_count().await.unwrap(), 0);
    }

    #[test]
    fn test_display_format() {
        let retrieved = vec![RetrievedChunk { chunk: chunk("Some text", 9), score: 0.5 }];
        assert_eq!(
            format_context_for_display(&retrieved),
            "[1] notes.pdf, page 9 (score: 0.50)\nSome text"
        );
    }
}

//! Embedding generation for semantic search and retrieval.

mod hash;
mod ollama;
mod openai;

pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the embedder selected in settings.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let cfg = &settings.embedding;
    let embedder: Arc<dyn Embedder> = match cfg.provider {
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &cfg.model,
            cfg.dimensions as usize,
        )?),
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(
            &settings.llm.ollama_url,
            &cfg.ollama_model,
            Duration::from_secs(settings.llm.timeout_secs),
        )?),
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(cfg.dimensions as usize)),
    };
    Ok(embedder)
}

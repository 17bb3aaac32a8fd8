//! Ollama embeddings via `POST /api/embeddings`.

use super::Embedder;
use crate::error::{QuizError, Result};
use crate::ollama::{create_http_client, endpoint};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedder backed by a local Ollama server. One request per text.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    url: Url,
    model: String,
    /// Learned from the first response.
    dimensions: std::sync::OnceLock<usize>,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_http_client(timeout)?,
            url: endpoint(base_url, "api/embeddings")?,
            model: model.to_string(),
            dimensions: std::sync::OnceLock::new(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&EmbedRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QuizError::Embedding(format!(
                "Ollama embedding failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response.json().await?;
        if parsed.embedding.is_empty() {
            return Err(QuizError::Embedding(
                "Ollama returned an empty embedding".to_string(),
            ));
        }

        let _ = self.dimensions.set(parsed.embedding.len());
        Ok(parsed.embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!("Embedding {} texts with Ollama", texts.len());
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions.get().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(EmbedRequest {
            model: "nomic-embed-text",
            prompt: "photosynthesis",
        })
        .unwrap();
        assert_eq!(body["model"], "nomic-embed-text");
        assert_eq!(body["prompt"], "photosynthesis");
    }

    #[test]
    fn test_dimensions_unknown_until_first_call() {
        let embedder =
            OllamaEmbedder::new("http://localhost:11434", "nomic-embed-text", Duration::from_secs(5))
                .unwrap();
        assert_eq!(embedder.dimensions(), 0);
        assert_eq!(embedder.url.as_str(), "http://localhost:11434/api/embeddings");
    }
}

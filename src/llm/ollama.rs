//! Ollama backend via `POST /api/generate` with streaming disabled.

use super::TextGenerator;
use crate::error::{QuizError, Result};
use crate::ollama::{create_http_client, endpoint};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Generator backed by a local Ollama server.
pub struct OllamaGenerator {
    client: reqwest::Client,
    url: Url,
    model: String,
    temperature: f32,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str, temperature: f32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_http_client(timeout)?,
            url: endpoint(base_url, "api/generate")?,
            model: model.to_string(),
            temperature,
        })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&self.request(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QuizError::Generation(format!(
                "Ollama generation failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        debug!("Received {} characters", parsed.response.len());
        Ok(parsed.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

//! Text generation backends.
//!
//! Every backend takes one rendered prompt and returns the model's raw text.
//! Nothing is retried: failures go straight back to the caller.

mod mock;
mod ollama;
mod openai;

pub use mock::MockGenerator;
pub use ollama::OllamaGenerator;
pub use openai::OpenAIGenerator;

use crate::config::{LlmProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A language model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a single prompt and return the unmodified response text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;
}

/// Create the generator selected in settings.
pub fn create_generator(settings: &Settings) -> Result<Arc<dyn TextGenerator>> {
    let llm = &settings.llm;
    let timeout = Duration::from_secs(llm.timeout_secs);

    let generator: Arc<dyn TextGenerator> = match llm.provider {
        LlmProvider::OpenAI => Arc::new(OpenAIGenerator::new(&llm.model, llm.temperature, timeout)?),
        LlmProvider::Ollama => Arc::new(OllamaGenerator::new(
            &llm.ollama_url,
            &llm.ollama_model,
            llm.temperature,
            timeout,
        )?),
        LlmProvider::Mock => Arc::new(MockGenerator::new()),
    };

    info!("Using {} for generation", generator.name());
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_generator_follows_provider() {
        let mut settings = Settings::default();

        settings.llm.provider = LlmProvider::Mock;
        assert_eq!(create_generator(&settings).unwrap().name(), "mock");

        settings.llm.provider = LlmProvider::Ollama;
        assert_eq!(create_generator(&settings).unwrap().name(), "ollama");

        settings.llm.ollama_url = "::nope::".to_string();
        assert!(create_generator(&settings).is_err());
    }
}

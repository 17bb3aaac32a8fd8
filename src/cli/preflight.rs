//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{EmbeddingProvider, LlmProvider, Settings};
use crate::error::{QuizError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Ingestion embeds chunks and summarizes. Media also needs ffmpeg
    /// and transcription.
    Ingest { media: bool },
    /// Question generation embeds the topic and calls the model.
    Question,
    /// Search only embeds the topic.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    if let Operation::Ingest { media: true } = operation {
        check_tool("ffmpeg")?;
        check_tool("ffprobe")?;
    }

    if needs_openai(operation, settings) {
        check_api_key()?;
    }

    Ok(())
}

/// Whether the operation will call the OpenAI API with these settings.
fn needs_openai(operation: Operation, settings: &Settings) -> bool {
    let embeds_with_openai = settings.embedding.provider == EmbeddingProvider::OpenAI;
    let generates_with_openai = settings.llm.provider == LlmProvider::OpenAI;

    match operation {
        Operation::Ingest { media } => media || embeds_with_openai || generates_with_openai,
        Operation::Question => embeds_with_openai || generates_with_openai,
        Operation::Search => embeds_with_openai,
    }
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(QuizError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(QuizError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...' \
             or switch to Ollama in the config file"
                .to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(QuizError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(QuizError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(QuizError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_settings() -> Settings {
        let mut settings = Settings::default();
        settings.llm.provider = LlmProvider::Ollama;
        settings.embedding.provider = EmbeddingProvider::Hash;
        settings
    }

    #[test]
    fn test_offline_backends_need_no_key() {
        let settings = offline_settings();
        assert!(!needs_openai(Operation::Ingest { media: false }, &settings));
        assert!(!needs_openai(Operation::Question, &settings));
        assert!(check(Operation::Search, &settings).is_ok());
    }

    #[test]
    fn test_media_always_needs_transcription_key() {
        let settings = offline_settings();
        assert!(needs_openai(Operation::Ingest { media: true }, &settings));
    }

    #[test]
    fn test_openai_embeddings_needed_for_search() {
        let mut settings = offline_settings();
        settings.embedding.provider = EmbeddingProvider::OpenAI;
        assert!(needs_openai(Operation::Search, &settings));
        assert!(needs_openai(Operation::Question, &settings));
    }
}

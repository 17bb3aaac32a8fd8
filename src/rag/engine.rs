//! Question generation over the indexed document.

use super::context::{format_context, ContextBuilder};
use crate::config::Prompts;
use crate::llm::TextGenerator;
use crate::error::Result;
use crate::quiz::{validator, FallbackReason, QuizRecord};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Default number of chunks used as context for one question.
pub const DEFAULT_TOP_K: usize = 2;

/// Retrieves context for a topic, asks the model for a question and
/// validates what comes back.
pub struct QuizEngine {
    context: ContextBuilder,
    generator: Arc<dyn TextGenerator>,
    prompts: Prompts,
    top_k: usize,
}

impl QuizEngine {
    pub fn new(context: ContextBuilder, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            context,
            generator,
            prompts: Prompts::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set how many chunks are retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn context(&self) -> &ContextBuilder {
        &self.context
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Generate one question about `topic`.
    ///
    /// Retrieval misses and unusable model output come back as fallback
    /// records. Only retrieval and model call failures are errors.
    #[instrument(skip(self), fields(generator = %self.generator.name()))]
    pub async fn generate_question(&self, topic: &str) -> Result<QuizRecord> {
        let retrieved = self.context.retrieve(topic, self.top_k).await?;

        let Some(top) = retrieved.first() else {
            warn!("No passage matches '{}'", topic);
            return Ok(QuizRecord::fallback(topic, FallbackReason::TopicNotFound));
        };

        let prompt = self.prompts.quiz_prompt(topic, &format_context(&retrieved));
        info!("Generating question from {} passages", retrieved.len());
        let raw = self.generator.generate(&prompt).await?;

        Ok(validator::validate_response(topic, &raw, Some(&top.chunk.metadata)))
    }

    /// Ask the model for the key points of `text`.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let prompt = self.prompts.summary_prompt(text);
        let summary = self.generator.generate(&prompt).await?;
        Ok(summary.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{DocumentChunk, SourceMetadata};
    use crate::embedding::HashEmbedder;
    use crate::error::QuizError;
    use crate::ingestion::SourceKind;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replies with a fixed text and remembers the prompts it got.
    struct ScriptedGenerator {
        reply: String,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(QuizError::Generation("model unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    const REPLY: &str = "```json\n{\"question\": \"What produces ATP?\", \"options\": [\"Mitochondria\", \"Nucleus\", \"Ribosome\", \"Vacuole\"], \"reponse_correcte\": \"Mitochondria\", \"explication\": \"Stated on page 2.\", \"citation_source\": \"Mitochondria produce ATP through respiration.\",}\n```";

    async fn engine_with(generator: Arc<dyn TextGenerator>) -> QuizEngine {
        let context = ContextBuilder::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(HashEmbedder::new(1024)),
        );

        let meta = |page| SourceMetadata {
            source_id: "biology.pdf".to_string(),
            kind: SourceKind::Pdf,
            page: Some(page),
        };
        context
            .index(vec![
                DocumentChunk::new("Mitochondria produce ATP through respiration.".into(), meta(2)),
                DocumentChunk::new("ATP stores energy for the cell.".into(), meta(3)),
                DocumentChunk::new("The French revolution began in 1789.".into(), meta(9)),
            ])
            .await
            .unwrap();

        QuizEngine::new(context, generator)
    }

    #[tokio::test]
    async fn test_question_carries_top_chunk_metadata() {
        let generator = Arc::new(ScriptedGenerator::new(REPLY));
        let engine = engine_with(generator.clone()).await;

        let record = engine.generate_question("mitochondria ATP").await.unwrap();

        assert!(!record.is_fallback());
        assert_eq!(record.correct_option, "Mitochondria");
        assert_eq!(record.source_metadata.as_ref().and_then(|m| m.page), Some(2));

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Mitochondria produce ATP through respiration.\n\nATP stores energy"));
        assert!(prompts[0].contains("\"mitochondria ATP\""));
        assert!(!prompts[0].contains("French revolution"));
    }

    #[tokio::test]
    async fn test_unknown_topic_never_calls_model() {
        let generator = Arc::new(ScriptedGenerator::new(REPLY));
        let engine = engine_with(generator.clone()).await;

        let record = engine.generate_question("quantum chromodynamics").await.unwrap();

        assert_eq!(record.fallback_reason, Some(FallbackReason::TopicNotFound));
        assert!(record.explanation.contains("topic not found in document"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_index_never_calls_model() {
        let generator = Arc::new(ScriptedGenerator::new(REPLY));
        let engine = QuizEngine::new(
            ContextBuilder::new(
                Arc::new(MemoryVectorStore::new()),
                Arc::new(HashEmbedder::new(64)),
            ),
            generator.clone(),
        );

        let record = engine.generate_question("mitochondria").await.unwrap();
        assert_eq!(record.fallback_reason, Some(FallbackReason::TopicNotFound));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let engine = engine_with(Arc::new(FailingGenerator)).await;
        let err = engine.generate_question("mitochondria").await.unwrap_err();
        assert!(matches!(err, QuizError::Generation(_)));
    }

    #[tokio::test]
    async fn test_refusal_becomes_malformed_output() {
        let engine = engine_with(Arc::new(ScriptedGenerator::new("Sorry, I can't help."))).await;
        let record = engine.generate_question("mitochondria").await.unwrap();
        assert_eq!(record.fallback_reason, Some(FallbackReason::MalformedOutput));
    }

    #[tokio::test]
    async fn test_summarize_uses_summary_prompt() {
        let generator = Arc::new(ScriptedGenerator::new("\n• one\n• two\n• three\n"));
        let engine = engine_with(generator.clone()).await;

        let summary = engine.summarize("Cells divide by mitosis.").await.unwrap();

        assert_eq!(summary, "• one\n• two\n• three");
        assert!(generator.prompts.lock().unwrap()[0].contains("Cells divide by mitosis."));
    }
}

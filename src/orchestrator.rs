//! Pipeline orchestrator for glassquiz.
//!
//! Coordinates the whole process from an uploaded file to an indexed
//! document, and hands out quiz questions afterwards.

use crate::chunking::{create_chunker, Chunker};
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{QuizError, Result};
use crate::ingestion::{detect_loader, MediaLoader, SourceKind};
use crate::llm::{create_generator, TextGenerator};
use crate::quiz::QuizRecord;
use crate::rag::{ContextBuilder, QuizEngine};
use crate::transcription::{Transcriber, WhisperTranscriber};
use crate::vector_store::{create_store, VectorStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the glassquiz pipeline.
pub struct Orchestrator {
    settings: Settings,
    media: MediaLoader,
    chunker: Box<dyn Chunker>,
    engine: QuizEngine,
}

impl Orchestrator {
    /// Create an orchestrator with the backends selected in settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::with_config(
            &settings.transcription.model,
            settings.transcription.chunk_duration_seconds,
            settings.transcription.language.clone(),
        )?);

        let embedder = create_embedder(&settings)?;
        let vector_store = create_store(&settings)?;
        let generator = create_generator(&settings)?;

        Self::with_components(settings, prompts, transcriber, embedder, vector_store, generator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        transcriber: Arc<dyn Transcriber>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        let chunker = create_chunker(&settings.chunking)?;
        let context = ContextBuilder::new(vector_store, embedder)
            .with_min_score(settings.retrieval.min_score);
        let engine = QuizEngine::new(context, generator)
            .with_prompts(prompts)
            .with_top_k(settings.retrieval.top_k);

        Ok(Self {
            media: MediaLoader::new(transcriber, temp_dir),
            settings,
            chunker,
            engine,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the quiz engine.
    pub fn engine(&self) -> &QuizEngine {
        &self.engine
    }

    /// Extract, chunk and index a file, replacing the previous index, then
    /// summarize its opening.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn ingest(&self, path: &Path) -> Result<IngestResult> {
        if !path.is_file() {
            return Err(QuizError::InvalidInput(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let loader = detect_loader(path, self.media.clone())?;
        info!("Loading {} document", loader.kind());
        let doc = loader.load(path).await?;

        if !doc.has_text() {
            return Err(QuizError::Extraction(format!(
                "No text could be extracted from {}",
                doc.source_id
            )));
        }

        let chunks = self.chunker.chunk(&doc);
        info!("Split {} pages into {} chunks", doc.pages.len(), chunks.len());
        let chunks_indexed = self.engine.context().index(chunks).await?;

        let preview = doc.preview(self.settings.summary.max_chars);
        let summary = match self.engine.summarize(&preview).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Key-point summary failed: {}", e);
                None
            }
        };

        Ok(IngestResult {
            source_id: doc.source_id,
            title: doc.title,
            kind: doc.kind,
            pages: doc.pages.len(),
            chunks_indexed,
            summary,
        })
    }

    /// Generate one question about `topic` from the indexed document.
    pub async fn generate_question(&self, topic: &str) -> Result<QuizRecord> {
        self.engine.generate_question(topic).await
    }
}

/// Result of ingesting one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResult {
    pub source_id: String,
    pub title: String,
    pub kind: SourceKind,
    /// Number of extracted pages with text.
    pub pages: usize,
    pub chunks_indexed: usize,
    /// Key points of the opening text, `None` if the model call failed.
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::llm::MockGenerator;
    use crate::transcription::Transcript;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::time::Duration;

    struct SilentTranscriber;

    #[async_trait]
    impl Transcriber for SilentTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript> {
            Ok(Transcript::new(Vec::new()))
        }
    }

    fn orchestrator(temp: &Path) -> Orchestrator {
        let mut settings = Settings::default();
        settings.general.temp_dir = temp.join("tmp").display().to_string();
        settings.chunking.chunk_size = 60;
        settings.chunking.chunk_overlap = 10;

        Orchestrator::with_components(
            settings,
            Prompts::default(),
            Arc::new(SilentTranscriber),
            Arc::new(HashEmbedder::new(512)),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(MockGenerator::new().with_delay(Duration::ZERO)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_then_question() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.md");
        std::fs::write(
            &path,
            "Cells are the basic unit of life.\n\nMitochondria produce ATP for the cell.\n\nRibosomes assemble proteins from amino acids.",
        )
        .unwrap();

        let orchestrator = orchestrator(dir.path());
        let result = orchestrator.ingest(&path).await.unwrap();

        assert_eq!(result.source_id, "cells.md");
        assert_eq!(result.kind, SourceKind::Text);
        assert_eq!(result.pages, 1);
        assert_eq!(result.chunks_indexed, 3);
        assert_eq!(result.summary.as_deref().map(|s| s.lines().count()), Some(3));

        let record = orchestrator.generate_question("mitochondria ATP").await.unwrap();
        assert!(!record.is_fallback());
        assert!(record.is_consistent());
        assert_eq!(
            record.source_metadata.as_ref().map(|m| m.source_id.as_str()),
            Some("cells.md")
        );
    }

    #[tokio::test]
    async fn test_unsupported_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());

        let slides = dir.path().join("slides.pptx");
        std::fs::write(&slides, b"binary").unwrap();
        assert!(matches!(
            orchestrator.ingest(&slides).await,
            Err(QuizError::UnsupportedFormat(ext)) if ext == ".pptx"
        ));

        let missing = dir.path().join("missing.pdf");
        assert!(matches!(
            orchestrator.ingest(&missing).await,
            Err(QuizError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_document_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n\n  ").unwrap();

        let err = orchestrator(dir.path()).ingest(&path).await.unwrap_err();
        assert!(matches!(err, QuizError::Extraction(_)));
    }
}

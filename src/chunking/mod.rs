//! Text chunking strategies for breaking documents into searchable passages.
//!
//! Chunks are cut per page so each one keeps the page it came from.

mod recursive;
mod words;

pub use recursive::RecursiveChunker;
pub use words::WordWindowChunker;

use crate::config::ChunkingSettings;
use crate::error::{QuizError, Result};
use crate::ingestion::{ExtractedDocument, SourceKind};
use serde::{Deserialize, Serialize};

/// Where a chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Identifier of the source document (its file name).
    pub source_id: String,
    /// Kind of source.
    pub kind: SourceKind,
    /// 1-based page number, `None` for transcripts and plain text.
    pub page: Option<u32>,
}

impl SourceMetadata {
    /// Human-readable location, e.g. "lecture.pdf, page 4".
    pub fn location(&self) -> String {
        match self.page {
            Some(page) => format!("{}, page {}", self.source_id, page),
            None => format!("{} ({})", self.source_id, self.kind),
        }
    }
}

/// A passage of document text ready for embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub metadata: SourceMetadata,
}

impl DocumentChunk {
    pub fn new(text: String, metadata: SourceMetadata) -> Self {
        Self { text, metadata }
    }
}

/// Chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// Recursive character splitting on a separator hierarchy.
    Recursive,
    /// Fixed windows of words.
    Words,
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recursive" => Ok(ChunkingStrategy::Recursive),
            "words" => Ok(ChunkingStrategy::Words),
            _ => Err(format!("Unknown chunking strategy: {}", s)),
        }
    }
}

/// Trait for text chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split a single text into passages.
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split a document page by page.
    fn chunk(&self, doc: &ExtractedDocument) -> Vec<DocumentChunk> {
        doc.pages
            .iter()
            .flat_map(|page| {
                let metadata = SourceMetadata {
                    source_id: doc.source_id.clone(),
                    kind: doc.kind,
                    page: page.number,
                };
                self.split_text(&page.text)
                    .into_iter()
                    .map(move |text| DocumentChunk::new(text, metadata.clone()))
            })
            .collect()
    }
}

/// Create a chunker from settings.
pub fn create_chunker(settings: &ChunkingSettings) -> Result<Box<dyn Chunker>> {
    let strategy: ChunkingStrategy = settings.strategy.parse().map_err(QuizError::Config)?;

    if settings.chunk_size == 0 {
        return Err(QuizError::Config("chunk_size must be greater than zero".into()));
    }
    if settings.chunk_overlap >= settings.chunk_size {
        return Err(QuizError::Config(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            settings.chunk_overlap, settings.chunk_size
        )));
    }

    Ok(match strategy {
        ChunkingStrategy::Recursive => Box::new(RecursiveChunker::new(
            settings.chunk_size,
            settings.chunk_overlap,
            settings.separators.clone(),
        )),
        ChunkingStrategy::Words => Box::new(WordWindowChunker::new(
            settings.chunk_size,
            settings.chunk_overlap,
        )),
    })
}

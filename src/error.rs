//! Error types for glassquiz.

use thiserror::Error;

/// Library-level error type for glassquiz operations.
///
/// Only ingestion and infrastructure failures surface here. Retrieval misses,
/// unparseable model output and detected hallucinations are absorbed into
/// fallback quiz records instead.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Audio processing failed: {0}")]
    Audio(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for glassquiz operations.
pub type Result<T> = std::result::Result<T, QuizError>;

//! glassquiz - Glass-box quizzes from course material
//!
//! Turns a PDF, a text file or a recorded lecture into multiple-choice
//! questions. Every question carries the sentence it was built from and the
//! page that sentence came from, so a learner can check the answer against
//! the source instead of trusting the model.
//!
//! # Overview
//!
//! - Extract text from PDFs, text/Markdown files, audio and video
//! - Split it into overlapping chunks and index their embeddings
//! - Retrieve the passages relevant to a topic and ask a language model for
//!   one question with a chain-of-thought trace
//! - Repair and validate the model output, falling back to a fixed error
//!   record instead of failing
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `ingestion` - Document loaders (PDF, text, media)
//! - `audio` / `transcription` - ffmpeg helpers and Whisper transcription
//! - `chunking` - Recursive character and word-window splitters
//! - `embedding` - Embedding backends
//! - `vector_store` - Chunk index (SQLite or in memory)
//! - `llm` - Text generation backends
//! - `quiz` - Quiz records, output validation and session state
//! - `rag` - Retrieval and question generation
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use glassquiz::config::Settings;
//! use glassquiz::orchestrator::Orchestrator;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator.ingest(Path::new("course.pdf")).await?;
//!     println!("Indexed {} chunks", result.chunks_indexed);
//!
//!     let record = orchestrator.generate_question("photosynthesis").await?;
//!     println!("{}", record.question);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod llm;
pub mod ollama;
pub mod openai;
pub mod orchestrator;
pub mod quiz;
pub mod rag;
pub mod transcription;
pub mod vector_store;

pub use error::{QuizError, Result};

//! Speech-to-text for media sources.
//!
//! Audio tracks are transcribed with OpenAI Whisper. Callers only use the
//! concatenated text; segment timing is kept for logging and tests.

mod models;
mod whisper;

pub use models::{format_timestamp, Transcript, TranscriptSegment};
pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

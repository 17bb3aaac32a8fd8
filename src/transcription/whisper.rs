//! OpenAI Whisper transcription implementation.

use super::{Transcriber, Transcript, TranscriptSegment};
use crate::audio::split_audio;
use crate::error::{QuizError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
    language: Option<String>,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config("whisper-1", 600, None)
    }

    /// Create a new Whisper transcriber with custom configuration.
    pub fn with_config(
        model: &str,
        chunk_duration_seconds: u32,
        language: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            chunk_duration_seconds,
            language,
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<Transcript> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| QuizError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| QuizError::OpenAI(format!("Whisper API error: {}", e)))?;

        let segments: Vec<TranscriptSegment> = response
            .segments
            .map(|segs| {
                segs.iter()
                    .map(|s| {
                        TranscriptSegment::new(s.start as f64, s.end as f64, s.text.trim().to_string())
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![TranscriptSegment::new(
                    0.0,
                    response.duration as f64,
                    response.text.trim().to_string(),
                )]
            });

        debug!("Transcribed {} segments", segments.len());
        Ok(Transcript::new(segments))
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let temp_dir = tempfile::tempdir()?;
        let pieces = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if pieces.len() == 1 {
            return self.transcribe_single(audio_path).await;
        }

        info!("Transcribing {} audio pieces with {}", pieces.len(), self.model);

        let pb = ProgressBar::new(pieces.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
                .map_err(|e| QuizError::Transcription(e.to_string()))?
                .progress_chars("█▓░"),
        );

        // One request at a time: each user action blocks until its calls complete.
        let mut parts = Vec::with_capacity(pieces.len());
        for (idx, (piece_path, offset)) in pieces.into_iter().enumerate() {
            let transcript = match self.transcribe_single(&piece_path).await {
                Ok(t) => t,
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(QuizError::Transcription(format!(
                        "Piece {} at {:.0}s failed: {}",
                        idx, offset, e
                    )));
                }
            };
            pb.inc(1);
            parts.push((offset, transcript));
        }

        pb.finish_and_clear();
        drop(temp_dir);

        Ok(Transcript::merge(parts))
    }
}

//! Audio and video loader.
//!
//! The audio track is extracted with ffmpeg and transcribed. The result is a
//! single text blob: no page or segment metadata, only the media kind tag.

use super::{extension_of, DocumentLoader, ExtractedDocument, ExtractedPage, SourceKind};
use crate::audio::extract_audio;
use crate::error::{QuizError, Result};
use crate::transcription::{format_timestamp, Transcriber};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Supported audio file extensions (transcribed directly).
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "ogg"];

/// Supported video file extensions (audio will be extracted).
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "webm", "avi", "m4v"];

/// Loader for audio and video files.
#[derive(Clone)]
pub struct MediaLoader {
    transcriber: Arc<dyn Transcriber>,
    temp_dir: PathBuf,
}

impl MediaLoader {
    pub fn new(transcriber: Arc<dyn Transcriber>, temp_dir: PathBuf) -> Self {
        Self {
            transcriber,
            temp_dir,
        }
    }

    fn is_audio_file(path: &Path) -> bool {
        extension_of(path)
            .map(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    fn is_video_file(path: &Path) -> bool {
        extension_of(path)
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

/// Whether a file is audio or video, and so needs ffmpeg and transcription.
pub fn is_media_file(path: &Path) -> bool {
    MediaLoader::is_audio_file(path) || MediaLoader::is_video_file(path)
}

#[async_trait]
impl DocumentLoader for MediaLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::Media
    }

    fn supports(&self, path: &Path) -> bool {
        is_media_file(path)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn load(&self, path: &Path) -> Result<ExtractedDocument> {
        let (audio_path, extracted) = if Self::is_video_file(path) {
            info!("Extracting audio track");
            (extract_audio(path, &self.temp_dir).await?, true)
        } else {
            (path.to_path_buf(), false)
        };

        info!("Transcribing audio");
        let transcript = self.transcriber.transcribe(&audio_path).await;

        if extracted {
            if let Err(e) = std::fs::remove_file(&audio_path) {
                warn!("Failed to clean up extracted audio: {}", e);
            }
        }

        let transcript = transcript?;
        if transcript.full_text.trim().is_empty() {
            return Err(QuizError::Transcription(
                "Transcription produced no text".to_string(),
            ));
        }

        info!(
            "Transcribed {} of audio ({} segments)",
            format_timestamp(transcript.duration_seconds),
            transcript.segments.len()
        );

        Ok(ExtractedDocument::from_path(
            path,
            SourceKind::Media,
            vec![ExtractedPage {
                number: None,
                text: transcript.full_text,
            }],
        ))
    }
}

//! Document ingestion for glassquiz.
//!
//! Turns an uploaded file into plain text with page metadata. Each file type
//! has its own [`DocumentLoader`]; [`detect_loader`] picks one by extension.

mod media;
mod pdf;
mod text;

pub use media::{is_media_file, MediaLoader};
pub use pdf::PdfLoader;
pub use text::TextLoader;

use crate::error::{QuizError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of source a document was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Text,
    /// Audio or video, transcribed to a single text blob.
    Media,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Pdf => write!(f, "pdf"),
            SourceKind::Text => write!(f, "text"),
            SourceKind::Media => write!(f, "media"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(SourceKind::Pdf),
            "text" => Ok(SourceKind::Text),
            "media" => Ok(SourceKind::Media),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}

/// Text of one page (or the whole file when the source has no pages).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// 1-based page number, `None` for unpaged sources.
    pub number: Option<u32>,
    /// Extracted text.
    pub text: String,
}

/// A document after text extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Stable identifier (the file name).
    pub source_id: String,
    /// Human-readable title.
    pub title: String,
    /// Kind of source.
    pub kind: SourceKind,
    /// Extracted pages in order.
    pub pages: Vec<ExtractedPage>,
}

impl ExtractedDocument {
    /// Build a document identified by its file name.
    pub fn from_path(path: &Path, kind: SourceKind, pages: Vec<ExtractedPage>) -> Self {
        let source_id = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string();

        Self {
            source_id,
            title,
            kind,
            pages,
        }
    }

    /// All text, pages separated by blank lines.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Leading characters of the first page, used for the key-point summary.
    pub fn preview(&self, max_chars: usize) -> String {
        self.pages
            .first()
            .map(|p| p.text.chars().take(max_chars).collect())
            .unwrap_or_default()
    }

    /// Whether any page carries non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|p| !p.text.trim().is_empty())
    }
}

/// Trait for file loaders.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Kind of document this loader produces.
    fn kind(&self) -> SourceKind;

    /// Check if this loader can handle the given file.
    fn supports(&self, path: &Path) -> bool;

    /// Extract text from the file.
    async fn load(&self, path: &Path) -> Result<ExtractedDocument>;
}

/// Lower-cased extension of a path.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Pick the loader for a file based on its extension.
///
/// `media` is supplied by the caller because it carries the transcriber.
pub fn detect_loader(path: &Path, media: MediaLoader) -> Result<Box<dyn DocumentLoader>> {
    let pdf = PdfLoader::new();
    if pdf.supports(path) {
        return Ok(Box::new(pdf));
    }

    let text = TextLoader::new();
    if text.supports(path) {
        return Ok(Box::new(text));
    }

    if media.supports(path) {
        return Ok(Box::new(media));
    }

    Err(QuizError::UnsupportedFormat(
        extension_of(path)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| path.display().to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{Transcriber, Transcript};
    use std::path::PathBuf;
    use std::sync::Arc;

    struct SilentTranscriber;

    #[async_trait]
    impl Transcriber for SilentTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript> {
            Ok(Transcript::new(Vec::new()))
        }
    }

    fn media_loader() -> MediaLoader {
        MediaLoader::new(Arc::new(SilentTranscriber), std::env::temp_dir())
    }

    #[test]
    fn test_detect_loader_by_extension() {
        let kind = |p: &str| detect_loader(Path::new(p), media_loader()).map(|l| l.kind());

        assert_eq!(kind("course.pdf").unwrap(), SourceKind::Pdf);
        assert_eq!(kind("COURSE.PDF").unwrap(), SourceKind::Pdf);
        assert_eq!(kind("notes.md").unwrap(), SourceKind::Text);
        assert_eq!(kind("script.py").unwrap(), SourceKind::Text);
        assert_eq!(kind("lecture.mp4").unwrap(), SourceKind::Media);
        assert_eq!(kind("podcast.mp3").unwrap(), SourceKind::Media);
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let err = detect_loader(Path::new("slides.pptx"), media_loader()).err().unwrap();
        assert!(matches!(err, QuizError::UnsupportedFormat(ref ext) if ext == ".pptx"));

        let err = detect_loader(Path::new("README"), media_loader()).err().unwrap();
        assert!(matches!(err, QuizError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_document_preview_and_ids() {
        let doc = ExtractedDocument::from_path(
            &PathBuf::from("/tmp/biology.pdf"),
            SourceKind::Pdf,
            vec![
                ExtractedPage {
                    number: Some(1),
                    text: "Cells are the unit of life.".to_string(),
                },
                ExtractedPage {
                    number: Some(2),
                    text: "Mitochondria produce energy.".to_string(),
                },
            ],
        );

        assert_eq!(doc.source_id, "biology.pdf");
        assert_eq!(doc.title, "biology");
        assert_eq!(doc.preview(5), "Cells");
        assert!(doc.full_text().contains("\n\nMitochondria"));
        assert!(doc.has_text());
    }
}

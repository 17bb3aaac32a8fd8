//! Plain text and Markdown loader.

use super::{extension_of, DocumentLoader, ExtractedDocument, ExtractedPage, SourceKind};
use crate::error::{QuizError, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{info, instrument};

/// Supported text file extensions.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "py"];

/// Loader for UTF-8 text files. The whole file is a single unnumbered page.
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::Text
    }

    fn supports(&self, path: &Path) -> bool {
        extension_of(path)
            .map(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn load(&self, path: &Path) -> Result<ExtractedDocument> {
        info!("Loading text file");
        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| QuizError::Extraction(format!("File is not valid UTF-8: {}", e)))?;

        Ok(ExtractedDocument::from_path(
            path,
            SourceKind::Text,
            vec![ExtractedPage { number: None, text }],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Cells\n\nCells are the unit of life.").unwrap();

        let doc = TextLoader::new().load(&path).await.unwrap();

        assert_eq!(doc.kind, SourceKind::Text);
        assert_eq!(doc.source_id, "notes.md");
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].number.is_none());
        assert!(doc.pages[0].text.contains("unit of life"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let err = TextLoader::new().load(&path).await.unwrap_err();
        assert!(matches!(err, QuizError::Extraction(_)));
    }

    #[test]
    fn test_supports() {
        let loader = TextLoader::new();
        assert!(loader.supports(Path::new("a.TXT")));
        assert!(loader.supports(Path::new("lesson.markdown")));
        assert!(!loader.supports(Path::new("a.pdf")));
    }
}

//! PDF text extraction.
//!
//! Text is pulled page by page with lopdf so each page keeps its number.
//! When that yields nothing (unusual fonts, odd content streams) the whole
//! document goes through pdf-extract and is reported as page 1.

use super::{extension_of, DocumentLoader, ExtractedDocument, ExtractedPage, SourceKind};
use crate::error::{QuizError, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Loader for PDF files.
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Extract per-page text from PDF bytes.
    pub fn extract_pages(data: &[u8]) -> Result<Vec<ExtractedPage>> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| QuizError::Extraction(format!("Failed to load PDF: {}", e)))?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => {
                    let text = clean_text(&text);
                    if !text.is_empty() {
                        pages.push(ExtractedPage {
                            number: Some(*page_number),
                            text,
                        });
                    }
                }
                Err(e) => debug!("No text on page {}: {}", page_number, e),
            }
        }

        if !pages.is_empty() {
            return Ok(pages);
        }

        warn!("Per-page extraction found no text, trying whole-document extraction");
        let text = pdf_extract::extract_text_from_mem(data)
            .map(|t| clean_text(&t))
            .map_err(|e| QuizError::Extraction(format!("PDF text extraction failed: {}", e)))?;

        if text.is_empty() {
            return Err(QuizError::Extraction(
                "PDF has no extractable text (it may be scanned images)".to_string(),
            ));
        }

        Ok(vec![ExtractedPage {
            number: Some(1),
            text,
        }])
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip NULs and trailing spaces. Runs of blank lines collapse to a single
/// paragraph break so the chunker can still split on paragraphs.
fn clean_text(text: &str) -> String {
    let mut out = String::new();
    let mut pending_break = false;

    for line in text.replace('\0', "").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            pending_break = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        pending_break = false;
    }

    out
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::Pdf
    }

    fn supports(&self, path: &Path) -> bool {
        extension_of(path).as_deref() == Some("pdf")
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn load(&self, path: &Path) -> Result<ExtractedDocument> {
        info!("Loading PDF");
        let data = tokio::fs::read(path).await?;

        let pages = tokio::task::spawn_blocking(move || Self::extract_pages(&data))
            .await
            .map_err(|e| QuizError::Extraction(format!("PDF extraction task failed: {}", e)))??;

        info!("Extracted {} pages", pages.len());
        Ok(ExtractedDocument::from_path(path, SourceKind::Pdf, pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        let raw = "\n\nTitle\0\n\n   \nFirst line   \nstill first\n\nSecond line\n\n";
        assert_eq!(clean_text(raw), "Title\n\nFirst line\nstill first\n\nSecond line");
    }

    #[test]
    fn test_paragraph_breaks_reach_the_chunker() {
        use crate::chunking::{Chunker, RecursiveChunker};

        let page = clean_text("First paragraph here.\n\n\n\nSecond paragraph here.");
        let chunker = RecursiveChunker::new(30, 0, Vec::new());
        assert_eq!(
            chunker.split_text(&page),
            vec!["First paragraph here.", "Second paragraph here."]
        );
    }

    #[test]
    fn test_invalid_pdf_is_extraction_error() {
        let err = PdfLoader::extract_pages(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, QuizError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let loader = PdfLoader::new();
        let err = loader.load(Path::new("/nonexistent/course.pdf")).await.unwrap_err();
        assert!(matches!(err, QuizError::Io(_)));
    }
}

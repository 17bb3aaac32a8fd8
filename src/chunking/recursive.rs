//! Recursive character splitting.
//!
//! Text is split on the first separator of the hierarchy that occurs in it.
//! Pieces that are still too long are split again with the remaining
//! separators, and short pieces are merged back into chunks of at most
//! `chunk_size` characters with up to `chunk_overlap` characters shared
//! between neighbours.

use super::Chunker;
use std::collections::VecDeque;
use tracing::warn;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Recursive character splitter. Lengths are counted in characters.
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: Vec<String>) -> Self {
        let separators = if separators.is_empty() {
            default_separators()
        } else {
            separators
        };

        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators,
        }
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];

        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut short_pieces: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                short_pieces.push(piece);
                continue;
            }

            if !short_pieces.is_empty() {
                chunks.extend(self.merge_pieces(&short_pieces));
                short_pieces.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !short_pieces.is_empty() {
            chunks.extend(self.merge_pieces(&short_pieces));
        }

        chunks
    }

    /// Greedily pack pieces into chunks, carrying overlap forward.
    fn merge_pieces(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of {} characters, longer than the limit of {}",
                        total, self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(chunk) = join_pieces(&current) {
                        chunks.push(chunk);
                    }

                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }

            current.push_back(piece);
            total += len;
        }

        if let Some(chunk) = join_pieces(&current) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP, default_separators())
    }
}

impl Chunker for RecursiveChunker {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }
}

/// Paragraph, line, word, then character boundaries.
pub fn default_separators() -> Vec<String> {
    ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `separator`, keeping it at the start of the following piece.
/// An empty separator splits into characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut boundaries: Vec<usize> = vec![0];
    boundaries.extend(text.match_indices(separator).map(|(idx, _)| idx));
    boundaries.push(text.len());
    boundaries.dedup();

    boundaries
        .windows(2)
        .map(|w| &text[w[0]..w[1]])
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

fn join_pieces(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = RecursiveChunker::default();
        let chunks = chunker.split_text("First paragraph.\n\nSecond paragraph.");
        assert_eq!(chunks, vec!["First paragraph.\n\nSecond paragraph."]);
    }

    #[test]
    fn test_word_split_with_overlap() {
        let chunker = RecursiveChunker::new(10, 4, default_separators());
        let chunks = chunker.split_text("one two three four five");
        assert_eq!(chunks, vec!["one two", "two three", "four five"]);
    }

    #[test]
    fn test_falls_back_to_characters() {
        let chunker = RecursiveChunker::new(4, 0, default_separators());
        let chunks = chunker.split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let paragraph = "The cell membrane controls what enters and leaves the cell. ".repeat(40);
        let text = format!("{}\n\n{}\nShort closing line.", paragraph, paragraph);

        let chunker = RecursiveChunker::new(200, 40, default_separators());
        let chunks = chunker.split_text(&text);

        assert!(chunks.len() > 10);
        assert!(chunks.iter().all(|c| c.chars().count() <= 200));
        assert!(chunks.iter().all(|c| c == c.trim() && !c.is_empty()));
        assert_eq!(chunks.last().map(String::as_str), Some("Short closing line."));
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        let chunker = RecursiveChunker::new(6, 0, default_separators());
        let chunks = chunker.split_text("éèàùç ôîâêû");
        assert_eq!(chunks, vec!["éèàùç", "ôîâêû"]);
    }

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\n\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\n", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("\n\nx", "\n\n"), vec!["\n\nx"]);
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let chunker = RecursiveChunker::default();
        assert!(chunker.split_text("").is_empty());
        assert!(chunker.split_text(" \n\n ").is_empty());
    }
}

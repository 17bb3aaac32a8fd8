//! Fixed-size word windows.

use super::Chunker;

/// Splits text into windows of `window` words, consecutive windows sharing
/// `overlap` words.
pub struct WordWindowChunker {
    window: usize,
    overlap: usize,
}

impl WordWindowChunker {
    pub fn new(window: usize, overlap: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            overlap: overlap.min(window - 1),
        }
    }
}

impl Chunker for WordWindowChunker {
    fn split_text(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let step = self.window - self.overlap;
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.window).min(words.len());
            chunks.push(words[start..end].join(" "));

            if end >= words.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_overlap() {
        let text = (0..10).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = WordWindowChunker::new(4, 1).split_text(&text);

        assert_eq!(chunks, vec!["w0 w1 w2 w3", "w3 w4 w5 w6", "w6 w7 w8 w9"]);
    }

    #[test]
    fn test_short_and_empty_text() {
        let chunker = WordWindowChunker::new(30, 5);
        assert_eq!(chunker.split_text("hello   world\n"), vec!["hello world"]);
        assert!(chunker.split_text("  \n ").is_empty());
    }

    #[test]
    fn test_overlap_clamped_below_window() {
        let chunks = WordWindowChunker::new(2, 5).split_text("a b c");
        assert_eq!(chunks, vec!["a b", "b c"]);
    }
}

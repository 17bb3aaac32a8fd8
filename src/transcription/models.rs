//! Data models for transcription.

use serde::{Deserialize, Serialize};

/// A complete transcript with segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Individual transcript segments with timestamps.
    pub segments: Vec<TranscriptSegment>,
    /// Full transcript text (concatenated segments).
    pub full_text: String,
    /// Total duration in seconds.
    pub duration_seconds: f64,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let duration_seconds = segments.last().map(|s| s.end_seconds).unwrap_or(0.0);

        Self {
            segments,
            full_text,
            duration_seconds,
        }
    }

    /// Merge transcripts of consecutive audio pieces, shifting each by its offset.
    pub fn merge(parts: Vec<(f64, Transcript)>) -> Self {
        let segments = parts
            .into_iter()
            .flat_map(|(offset, transcript)| {
                transcript.segments.into_iter().map(move |mut s| {
                    s.start_seconds += offset;
                    s.end_seconds += offset;
                    s
                })
            })
            .collect();

        Self::new(segments)
    }
}

/// A single segment of a transcript with timestamp information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Transcribed text content.
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text,
        }
    }
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_creation() {
        let segments = vec![
            TranscriptSegment::new(0.0, 5.0, "Hello world".to_string()),
            TranscriptSegment::new(5.0, 10.0, "This is a test".to_string()),
        ];

        let transcript = Transcript::new(segments);

        assert_eq!(transcript.full_text, "Hello world This is a test");
        assert_eq!(transcript.duration_seconds, 10.0);
    }

    #[test]
    fn test_merge_shifts_offsets() {
        let first = Transcript::new(vec![TranscriptSegment::new(0.0, 30.0, "one".to_string())]);
        let second = Transcript::new(vec![TranscriptSegment::new(0.0, 20.0, "two".to_string())]);

        let merged = Transcript::merge(vec![(0.0, first), (600.0, second)]);

        assert_eq!(merged.full_text, "one two");
        assert_eq!(merged.segments[1].start_seconds, 600.0);
        assert_eq!(merged.duration_seconds, 620.0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.0), "01:05");
        assert_eq!(format_timestamp(3665.0), "01:01:05");
    }
}

//! Offline generator with canned answers, for demos and UI testing.

use super::TextGenerator;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default pause before answering.
const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

/// Returns a fixed quiz question when the prompt asks for a quiz or JSON,
/// and a fixed three-point summary otherwise.
pub struct MockGenerator {
    delay: Duration,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn canned_quiz() -> String {
        json!({
            "question": "This is a simulated question (mock mode)?",
            "options": [
                "Answer A (wrong)",
                "Answer B (correct)",
                "Answer C (wrong)",
                "Answer D (wrong)"
            ],
            "reponse_correcte": "Answer B (correct)",
            "explication": "Hard-coded explanation used to exercise the display without calling a model.",
            "citation_source": "Simulated excerpt from the PDF document, page 12."
        })
        .to_string()
    }

    fn canned_summary() -> String {
        [
            "• Key concept 1 (simulated): mock mode lets you try the interface.",
            "• Key concept 2 (simulated): no model is called here.",
            "• Key concept 3 (simulated): every answer is canned.",
        ]
        .join("\n")
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let lowered = prompt.to_lowercase();
        if lowered.contains("quiz") || lowered.contains("json") {
            debug!("Returning canned quiz");
            Ok(Self::canned_quiz())
        } else {
            debug!("Returning canned summary");
            Ok(Self::canned_summary())
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_quiz_request_gets_json() {
        let generator = MockGenerator::new().with_delay(Duration::ZERO);
        let raw = generator.generate("Write a QUIZ question").await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["options"].as_array().unwrap().len(), 4);
        assert_eq!(value["reponse_correcte"], "Answer B (correct)");
    }

    #[test]
    fn test_other_requests_get_summary() {
        let generator = MockGenerator::new().with_delay(Duration::ZERO);
        let raw = tokio_test::block_on(generator.generate("Summarize this lesson")).unwrap();
        assert_eq!(raw.lines().count(), 3);
        assert!(raw.starts_with('•'));
    }
}

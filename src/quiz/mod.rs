//! Quiz records, model-output validation and session state.

mod session;
pub mod validator;

pub use session::{AnswerFeedback, QuizSession};

use crate::chunking::SourceMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder used for every option of a fallback record.
pub const FALLBACK_OPTION: &str = "Error";

/// Why a question could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Retrieval returned nothing for the topic.
    TopicNotFound,
    /// The model output contained no JSON object.
    MalformedOutput,
    /// A JSON object was found but did not parse, even after repair.
    FormattingError,
    /// The output matched the known topic confusion.
    HallucinationDetected,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FallbackReason::TopicNotFound => "topic not found in document",
            FallbackReason::MalformedOutput => "malformed output",
            FallbackReason::FormattingError => "formatting error",
            FallbackReason::HallucinationDetected => "hallucination detected",
        };
        f.write_str(text)
    }
}

/// One multiple-choice question with its supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "reponse_correcte")]
    pub correct_option: String,
    #[serde(alias = "explication")]
    pub explanation: String,
    #[serde(alias = "citation_source")]
    pub source_citation: String,
    /// Metadata of the best-matching retrieved chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_metadata: Option<SourceMetadata>,
    /// Chain-of-thought trace returned by the model.
    #[serde(default, alias = "raisonnement_cot", skip_serializing_if = "Option::is_none")]
    pub reasoning_trace: Option<String>,
    /// Set only on fallback records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

impl QuizRecord {
    /// The fixed-shape record returned when no real question is available.
    pub fn fallback(topic: &str, reason: FallbackReason) -> Self {
        Self {
            question: format!("Unable to generate a quiz question on '{}'", topic),
            options: vec![FALLBACK_OPTION.to_string(); 4],
            correct_option: FALLBACK_OPTION.to_string(),
            explanation: format!("Reasoning failed: {}", reason),
            source_citation: "System".to_string(),
            source_metadata: None,
            reasoning_trace: Some(
                "The model did not manage to follow the reasoning chain.".to_string(),
            ),
            fallback_reason: Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }

    /// Whether the user can pick an answer: a real question with options.
    pub fn is_answerable(&self) -> bool {
        !self.is_fallback() && !self.options.is_empty()
    }

    /// Whether the correct option is one of the options.
    pub fn is_consistent(&self) -> bool {
        self.options.iter().any(|o| o == &self.correct_option)
    }

    /// Option by 1-based number, as shown to the user.
    pub fn option(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    /// Resolve what a user typed, either a 1-based option number or the
    /// option text, to one of the options.
    pub fn resolve_choice(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        if let Ok(number) = input.parse::<usize>() {
            return self.option(number);
        }
        self.options
            .iter()
            .find(|o| o.trim().eq_ignore_ascii_case(input))
            .map(String::as_str)
    }

    /// Build a record from a parsed model object, tolerating missing or
    /// oddly typed fields.
    pub fn from_value(value: &Value) -> Self {
        let text = |keys: &[&str]| -> String {
            keys.iter()
                .find_map(|k| value.get(*k))
                .map(stringify)
                .unwrap_or_default()
        };

        let options = value
            .get("options")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|v| v.is_string() || v.is_number() || v.is_boolean())
                    .map(stringify)
                    .collect()
            })
            .unwrap_or_default();

        let reasoning_trace = ["reasoning_trace", "raisonnement_cot"]
            .iter()
            .find_map(|k| value.get(*k))
            .filter(|v| !v.is_null())
            .map(stringify);

        Self {
            question: text(&["question"]),
            options,
            correct_option: text(&["correct_option", "reponse_correcte"]),
            explanation: text(&["explanation", "explication"]),
            source_citation: text(&["source_citation", "citation_source"]),
            source_metadata: None,
            reasoning_trace,
            fallback_reason: None,
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_shape() {
        let record = QuizRecord::fallback("mitosis", FallbackReason::TopicNotFound);

        assert!(record.is_fallback());
        assert_eq!(record.question, "Unable to generate a quiz question on 'mitosis'");
        assert_eq!(record.options, vec!["Error"; 4]);
        assert_eq!(record.correct_option, "Error");
        assert!(record.explanation.contains("topic not found in document"));
        assert_eq!(record.source_citation, "System");
        assert!(record.is_consistent());
    }

    #[test]
    fn test_from_value_reads_wire_keys() {
        let value = json!({
            "raisonnement_cot": "Step 1",
            "question": "Q?",
            "options": ["A", "B", 3, null, {"x": 1}],
            "reponse_correcte": "B",
            "explication": "E",
            "citation_source": "S"
        });

        let record = QuizRecord::from_value(&value);

        assert_eq!(record.question, "Q?");
        assert_eq!(record.options, vec!["A", "B", "3"]);
        assert_eq!(record.correct_option, "B");
        assert_eq!(record.explanation, "E");
        assert_eq!(record.source_citation, "S");
        assert_eq!(record.reasoning_trace.as_deref(), Some("Step 1"));
        assert!(!record.is_fallback());
    }

    #[test]
    fn test_from_value_tolerates_missing_keys() {
        let record = QuizRecord::from_value(&json!({ "question": 42 }));

        assert_eq!(record.question, "42");
        assert!(record.options.is_empty());
        assert_eq!(record.correct_option, "");
        assert!(record.reasoning_trace.is_none());
        assert!(!record.is_consistent());
    }

    #[test]
    fn test_serde_accepts_aliases_and_writes_english_names() {
        let record: QuizRecord = serde_json::from_value(json!({
            "question": "Q?",
            "options": ["A", "B", "C", "D"],
            "reponse_correcte": "C",
            "explication": "because",
            "citation_source": "page text"
        }))
        .unwrap();
        assert_eq!(record.correct_option, "C");

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["correct_option"], "C");
        assert_eq!(out["source_citation"], "page text");
        assert!(out.get("fallback_reason").is_none());
    }

    #[test]
    fn test_option_numbers_are_one_based() {
        let record = QuizRecord::fallback("x", FallbackReason::MalformedOutput);
        assert_eq!(record.option(1), Some("Error"));
        assert_eq!(record.option(0), None);
        assert_eq!(record.option(5), None);
    }

    #[test]
    fn test_resolve_choice() {
        let record: QuizRecord = serde_json::from_value(json!({
            "question": "Which organelle produces ATP?",
            "options": ["Nucleus", "Mitochondrion", "Ribosome", "Golgi apparatus"],
            "correct_option": "Mitochondrion",
            "explanation": "",
            "source_citation": ""
        }))
        .unwrap();

        assert_eq!(record.resolve_choice(" 2 "), Some("Mitochondrion"));
        assert_eq!(record.resolve_choice("ribosome"), Some("Ribosome"));
        assert_eq!(record.resolve_choice("0"), None);
        assert_eq!(record.resolve_choice("chloroplast"), None);
    }

    #[test]
    fn test_record_without_options_is_not_answerable() {
        let record = QuizRecord::from_value(&json!({
            "question": "Only a question",
            "reponse_correcte": "B"
        }));

        assert!(!record.is_fallback());
        assert!(!record.is_answerable());
        assert_eq!(record.resolve_choice("1"), None);
        assert!(!QuizRecord::fallback("x", FallbackReason::TopicNotFound).is_answerable());
    }
}

//! Best-effort parsing of model output into quiz records.
//!
//! Models wrap their JSON in prose or code fences and leave trailing commas
//! behind. Only those defects are repaired. Whatever happens, the caller gets
//! a renderable [`QuizRecord`] back.

use super::{FallbackReason, QuizRecord};
use crate::chunking::SourceMetadata;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Topic term and output term of the single hard-coded confusion check.
const GUARD_TOPIC_TERM: &str = "transformer";
const GUARD_OUTPUT_TERM: &str = "megatron";

fn trailing_comma_before_brace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\}").expect("Invalid regex"))
}

fn trailing_comma_before_bracket() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\]").expect("Invalid regex"))
}

/// Cut the text from the first `{` to the last `}` and strip commas that
/// directly precede a closing brace or bracket.
///
/// Returns `None` when either brace is missing. When the last `}` comes
/// before the first `{` the result is empty, which will not parse.
pub fn repair_json(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;

    if end < start {
        return Some(String::new());
    }

    let candidate = &raw[start..=end];
    let candidate = trailing_comma_before_brace().replace_all(candidate, "}");
    let candidate = trailing_comma_before_bracket().replace_all(&candidate, "]");
    Some(candidate.into_owned())
}

/// Whether the parsed output matches the known topic confusion.
fn is_known_confusion(topic: &str, parsed: &Value) -> bool {
    topic.to_lowercase().contains(GUARD_TOPIC_TERM)
        && parsed.to_string().to_lowercase().contains(GUARD_OUTPUT_TERM)
}

/// Turn raw model text into a quiz record. Never fails: every problem
/// becomes a fallback record.
pub fn validate_response(
    topic: &str,
    raw: &str,
    top_chunk: Option<&SourceMetadata>,
) -> QuizRecord {
    debug!(
        "Raw model output: {}",
        raw.chars().take(200).collect::<String>()
    );

    let Some(candidate) = repair_json(raw) else {
        warn!("Model output contains no JSON object");
        return QuizRecord::fallback(topic, FallbackReason::MalformedOutput);
    };

    let parsed: Value = match serde_json::from_str(&candidate) {
        Ok(value) => value,
        Err(e) => {
            warn!("Model output is not valid JSON after repair: {}", e);
            return QuizRecord::fallback(topic, FallbackReason::FormattingError);
        }
    };

    if is_known_confusion(topic, &parsed) {
        warn!("Discarding output that confuses '{}' with an unrelated subject", topic);
        return QuizRecord::fallback(topic, FallbackReason::HallucinationDetected);
    }

    let mut record = QuizRecord::from_value(&parsed);
    if !record.is_consistent() {
        warn!("Correct option is not one of the proposed options");
    }

    record.source_metadata = top_chunk.cloned();
    debug!("Parsed quiz question with {} options", record.options.len());
    record
}

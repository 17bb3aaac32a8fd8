//! Per-user quiz state.

use super::QuizRecord;
use serde::{Deserialize, Serialize};

/// Result of checking an answer, with the evidence behind the correct one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_option: String,
    pub explanation: String,
    pub source_citation: String,
    /// Where the cited passage was found, e.g. "course.pdf, page 4".
    pub location: Option<String>,
}

/// State of one quiz session: document summary, current question and the
/// answer given to it. Lives for the process only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizSession {
    pub summary: Option<String>,
    pub current_question: Option<QuizRecord>,
    pub user_answer: Option<String>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the key points of a newly ingested document. Any question about
    /// the previous document is discarded.
    pub fn set_summary(&mut self, summary: String) {
        self.summary = Some(summary);
        self.current_question = None;
        self.user_answer = None;
    }

    /// Replace the current question and clear the previous answer.
    pub fn start_question(&mut self, record: QuizRecord) -> &QuizRecord {
        self.user_answer = None;
        self.current_question.insert(record)
    }

    /// Record an answer to the current question.
    ///
    /// Returns `None` when there is no question to answer. Answers to a
    /// fallback record, or to a question without options, are never correct.
    pub fn submit_answer(&mut self, choice: &str) -> Option<AnswerFeedback> {
        let question = self.current_question.as_ref()?;
        let choice = choice.trim();

        let feedback = AnswerFeedback {
            correct: question.is_answerable() && choice == question.correct_option.trim(),
            correct_option: question.correct_option.clone(),
            explanation: question.explanation.clone(),
            source_citation: question.source_citation.clone(),
            location: question.source_metadata.as_ref().map(|m| m.location()),
        };

        self.user_answer = Some(choice.to_string());
        Some(feedback)
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//! CLI output formatting utilities.

use crate::quiz::{AnswerFeedback, QuizRecord};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a question with numbered options.
    pub fn question(record: &QuizRecord) {
        println!("\n{}", style(&record.question).bold());
        for (i, option) in record.options.iter().enumerate() {
            println!("  {} {}", style(format!("{}.", i + 1)).cyan(), option);
        }
    }

    /// Print the verdict on an answer and the evidence behind it.
    pub fn feedback(feedback: &AnswerFeedback, reasoning: &str) {
        if feedback.correct {
            Self::success("Correct!");
        } else {
            println!(
                "{} Incorrect. The answer was: {}",
                style(">>").red().bold(),
                style(&feedback.correct_option).bold()
            );
        }

        if !feedback.explanation.is_empty() {
            Self::kv("Why", &feedback.explanation);
        }
        if !feedback.source_citation.is_empty() {
            Self::kv("Source", &format!("\"{}\"", feedback.source_citation));
        }
        if let Some(location) = &feedback.location {
            Self::kv("Found in", location);
        }
        if !reasoning.is_empty() {
            println!("  {}", style("Reasoning:").dim());
            for line in reasoning.lines() {
                println!("    {}", style(line).dim());
            }
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

//! Interactive quiz command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::quiz::{QuizRecord, QuizSession};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

use super::ingest::ingest_with;

/// Ingest a document, then ask questions on topics typed by the user.
pub async fn run_quiz(file: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Question, &settings)?;
    let orchestrator = Orchestrator::new(settings)?;
    let mut session = QuizSession::new();

    let ingested = ingest_with(&orchestrator, file).await?;
    if let Some(summary) = ingested.summary {
        session.set_summary(summary);
    }

    println!("{}", style("Quiz").bold().cyan());
    println!(
        "{}\n",
        style("Type a topic to get a question, or 'exit' to quit.").dim()
    );

    loop {
        let Some(topic) = prompt("Topic:")? else {
            break;
        };
        if topic.is_empty() {
            continue;
        }
        if is_exit(&topic) {
            break;
        }

        let spinner = Output::spinner("Generating question...");
        let record = orchestrator.generate_question(&topic).await;
        spinner.finish_and_clear();

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                Output::error(&format!("Error: {}", e));
                continue;
            }
        };

        if record.is_fallback() {
            Output::warning(&record.explanation);
            session.start_question(record);
            continue;
        }

        if !record.is_answerable() {
            Output::question(&record);
            Output::warning("The model proposed no options for this question.");
            show_evidence(&record);
            session.start_question(record);
            println!();
            continue;
        }

        let record = session.start_question(record);
        Output::question(record);
        let reasoning = record.reasoning_trace.clone().unwrap_or_default();

        let choice = loop {
            let Some(input) = prompt("Your answer (number):")? else {
                return Ok(());
            };
            if is_exit(&input) {
                Output::info("Goodbye!");
                return Ok(());
            }
            let current = session.current_question.as_ref();
            match current.and_then(|q| q.resolve_choice(&input)) {
                Some(choice) => break choice.to_string(),
                None => Output::warning("Enter the number of one of the options."),
            }
        };

        if let Some(feedback) = session.submit_answer(&choice) {
            Output::feedback(&feedback, &reasoning);
        }
        println!();
    }

    Output::info("Goodbye!");
    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Explanation, citation and location of a question that cannot be answered.
fn show_evidence(record: &QuizRecord) {
    if !record.explanation.is_empty() {
        Output::kv("Why", &record.explanation);
    }
    if !record.source_citation.is_empty() {
        Output::kv("Source", &format!("\"{}\"", record.source_citation));
    }
    if let Some(metadata) = &record.source_metadata {
        Output::kv("Found in", &metadata.location());
    }
}

/// Print a prompt and read one trimmed line. `None` on end of input.
fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{} ", style(label).green().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("1"));
        assert!(!is_exit(""));
    }
}

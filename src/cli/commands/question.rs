//! Question command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{IndexProvider, Settings};
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Generate one question from the on-disk index.
pub async fn run_question(topic: &str, json: bool, settings: Settings) -> Result<()> {
    if settings.index.provider == IndexProvider::Memory {
        Output::warning("The in-memory index is empty in a new process. Use `glassquiz quiz <file>` instead.");
    }

    preflight::check(Operation::Question, &settings)?;
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Generating question...");
    let record = orchestrator.generate_question(topic).await;
    spinner.finish_and_clear();
    let record = record?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    if record.is_fallback() {
        Output::warning(&record.explanation);
        return Ok(());
    }

    Output::question(&record);
    println!();
    Output::kv("Answer", &record.correct_option);
    Output::kv("Why", &record.explanation);
    Output::kv("Source", &format!("\"{}\"", record.source_citation));
    if let Some(metadata) = &record.source_metadata {
        Output::kv("Found in", &metadata.location());
    }

    Ok(())
}

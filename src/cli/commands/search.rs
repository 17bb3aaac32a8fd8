//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::context::format_context_for_display;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(topic: &str, limit: usize, settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;
    let orchestrator = Orchestrator::new(settings)?;
    let context = orchestrator.engine().context();

    if context.indexed_count().await? == 0 {
        Output::warning("The index is empty. Run `glassquiz ingest <file>` first.");
        return Ok(());
    }

    let spinner = Output::spinner("Searching...");
    let results = context.retrieve(topic, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(chunks) if chunks.is_empty() => {
            Output::warning("No passages found matching this topic.");
        }
        Ok(chunks) => {
            Output::success(&format!("Found {} passages", chunks.len()));
            println!();
            println!("{}", format_context_for_display(&chunks));
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

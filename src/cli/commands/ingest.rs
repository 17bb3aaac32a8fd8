//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::ingestion::is_media_file;
use crate::orchestrator::{IngestResult, Orchestrator};
use anyhow::Result;
use std::path::Path;

/// Run the ingest command.
pub async fn run_ingest(file: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    ingest_with(&orchestrator, file).await?;
    Ok(())
}

/// Index `file` with an existing orchestrator and print what was found.
pub(crate) async fn ingest_with(orchestrator: &Orchestrator, file: &str) -> Result<IngestResult> {
    let path = Settings::expand_path(file);
    preflight::check(
        Operation::Ingest {
            media: is_media_file(&path),
        },
        orchestrator.settings(),
    )?;

    let spinner = Output::spinner(&format!("Processing {}...", display_name(&path)));
    let result = orchestrator.ingest(&path).await;
    spinner.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    };

    Output::success(&format!("Indexed {}", result.title));
    Output::kv("Source", &result.source_id);
    Output::kv("Kind", &result.kind.to_string());
    Output::kv("Pages", &result.pages.to_string());
    Output::kv("Chunks", &result.chunks_indexed.to_string());

    match &result.summary {
        Some(summary) => {
            Output::header("Key points");
            for line in summary.lines().filter(|l| !l.trim().is_empty()) {
                println!("  {}", line.trim());
            }
        }
        None => Output::warning("Key points could not be generated."),
    }
    println!();

    Ok(result)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

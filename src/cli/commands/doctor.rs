//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{EmbeddingProvider, IndexProvider, LlmProvider, Settings};
use crate::ollama::{create_http_client, endpoint};
use crate::vector_store::DATABASE_FILE;
use console::style;
use std::process::Command;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("glassquiz doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let tools = vec![check_tool("ffmpeg"), check_tool("ffprobe")];
    print_section("External Tools (audio/video only)", &tools);
    checks.extend(tools);

    let backends = check_backends(settings).await;
    print_section("Model Backends", &backends);
    checks.extend(backends);

    let index = vec![check_index(settings)];
    print_section("Vector Index", &index);
    checks.extend(index);

    let config = vec![check_config_file()];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using glassquiz.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! glassquiz is ready to use.");
    }

    Ok(())
}

/// Check if ffmpeg or ffprobe is available. Missing tools only matter for
/// media files, so they are warnings.
fn check_tool(name: &str) -> CheckResult {
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect::<String>();
            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", install_hint_ffmpeg()),
        Err(_) => CheckResult::warning(name, "not found", install_hint_ffmpeg()),
    }
}

async fn check_backends(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let uses_openai = settings.llm.provider == LlmProvider::OpenAI
        || settings.embedding.provider == EmbeddingProvider::OpenAI;
    let uses_ollama = settings.llm.provider == LlmProvider::Ollama
        || settings.embedding.provider == EmbeddingProvider::Ollama;

    results.push(match settings.llm.provider {
        LlmProvider::OpenAI => CheckResult::ok("Generation", &format!("openai ({})", settings.llm.model)),
        LlmProvider::Ollama => {
            CheckResult::ok("Generation", &format!("ollama ({})", settings.llm.ollama_model))
        }
        LlmProvider::Mock => CheckResult::warning(
            "Generation",
            "mock (canned answers)",
            "Set llm.provider to openai or ollama for real questions",
        ),
    });

    results.push(match settings.embedding.provider {
        EmbeddingProvider::Hash => CheckResult::warning(
            "Embeddings",
            "hash (lexical matching only)",
            "Set embedding.provider to openai or ollama for semantic search",
        ),
        provider => CheckResult::ok("Embeddings", &provider.to_string()),
    });

    // Whisper is always OpenAI, so the key is worth checking either way.
    let key_check = check_openai_api_key();
    results.push(match key_check.status {
        CheckStatus::Error if !uses_openai => CheckResult::warning(
            &key_check.name,
            &key_check.message,
            "Only needed to transcribe audio and video",
        ),
        _ => key_check,
    });

    if uses_ollama {
        results.push(check_ollama(&settings.llm.ollama_url).await);
    }

    results
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check that the Ollama server answers.
async fn check_ollama(base_url: &str) -> CheckResult {
    let hint = "Start it with: ollama serve";

    let url = match endpoint(base_url, "api/tags") {
        Ok(url) => url,
        Err(e) => return CheckResult::error("Ollama", &e.to_string(), "Fix llm.ollama_url"),
    };
    let client = match create_http_client(Duration::from_secs(5)) {
        Ok(client) => client,
        Err(e) => return CheckResult::error("Ollama", &e.to_string(), hint),
    };

    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => CheckResult::ok("Ollama", base_url),
        Ok(response) => CheckResult::error(
            "Ollama",
            &format!("HTTP {} from {}", response.status(), base_url),
            hint,
        ),
        Err(_) => CheckResult::error("Ollama", &format!("unreachable at {}", base_url), hint),
    }
}

/// Check the on-disk index.
fn check_index(settings: &Settings) -> CheckResult {
    if settings.index.provider == IndexProvider::Memory {
        return CheckResult::warning(
            "Index",
            "in memory",
            "Questions can only be asked in the process that ingested the document",
        );
    }

    let db_path = settings.index_dir().join(DATABASE_FILE);
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        CheckResult::ok("Index", &format!("{} ({})", db_path.display(), size))
    } else {
        CheckResult::warning(
            "Index",
            &format!("{} (not created yet)", db_path.display()),
            "Index a document with: glassquiz ingest <file>",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: glassquiz config edit",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

//! HTTP plumbing shared by the Ollama generator and embedder.

use crate::error::{QuizError, Result};
use std::time::Duration;
use url::Url;

/// Create the reqwest client used for Ollama calls.
pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| QuizError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Resolve an API path against the configured base URL.
pub fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)
        .map_err(|e| QuizError::Config(format!("Invalid Ollama URL '{}': {}", base_url, e)))?;

    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }

    base.join(path.trim_start_matches('/'))
        .map_err(|e| QuizError::Config(format!("Invalid Ollama endpoint '{}': {}", path, e)))
}

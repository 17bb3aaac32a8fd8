//! Configuration settings for glassquiz.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub index: IndexSettings,
    pub retrieval: RetrievalSettings,
    pub transcription: TranscriptionSettings,
    pub summary: SummarySettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files (extracted audio, uploads).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.glassquiz".to_string(),
            temp_dir: "/tmp/glassquiz".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Text generation backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Hosted OpenAI chat completions.
    #[default]
    OpenAI,
    /// Local Ollama server.
    Ollama,
    /// Canned responses, no model involved.
    Mock,
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAI),
            "ollama" => Ok(LlmProvider::Ollama),
            "mock" | "facade" => Ok(LlmProvider::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::Ollama => write!(f, "ollama"),
            LlmProvider::Mock => write!(f, "mock"),
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Generation backend (openai, ollama, mock).
    pub provider: LlmProvider,
    /// OpenAI chat model.
    pub model: String,
    /// Ollama model name.
    pub ollama_model: String,
    /// Base URL of the Ollama server.
    pub ollama_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            ollama_model: "llama3".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            temperature: 0.3,
            timeout_secs: 300,
        }
    }
}

/// Embedding backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    OpenAI,
    Ollama,
    /// Offline feature-hashing embedder.
    Hash,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(EmbeddingProvider::OpenAI),
            "ollama" => Ok(EmbeddingProvider::Ollama),
            "hash" | "mock" => Ok(EmbeddingProvider::Hash),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::OpenAI => write!(f, "openai"),
            EmbeddingProvider::Ollama => write!(f, "ollama"),
            EmbeddingProvider::Hash => write!(f, "hash"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai, ollama, hash).
    pub provider: EmbeddingProvider,
    /// OpenAI embedding model.
    pub model: String,
    /// Ollama embedding model.
    pub ollama_model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::OpenAI,
            model: "text-embedding-3-small".to_string(),
            ollama_model: "nomic-embed-text".to_string(),
            dimensions: 1536,
        }
    }
}

/// Text chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Chunking strategy (recursive, words).
    pub strategy: String,
    /// Maximum chunk size (characters for recursive, words for words).
    pub chunk_size: usize,
    /// Overlap carried between consecutive chunks.
    pub chunk_overlap: usize,
    /// Separator priority for the recursive splitter.
    pub separators: Vec<String>,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            strategy: "recursive".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }
}

/// Vector index backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexProvider {
    /// On-disk SQLite index, rebuilt on every ingestion.
    #[default]
    Sqlite,
    /// Process-local index.
    Memory,
}

impl std::str::FromStr for IndexProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "disk" => Ok(IndexProvider::Sqlite),
            "memory" => Ok(IndexProvider::Memory),
            _ => Err(format!("Unknown index provider: {}", s)),
        }
    }
}

impl std::fmt::Display for IndexProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexProvider::Sqlite => write!(f, "sqlite"),
            IndexProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Index provider (sqlite, memory).
    pub provider: IndexProvider,
    /// Index directory. Deleted and recreated on every ingestion.
    pub path: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            provider: IndexProvider::Sqlite,
            path: "~/.glassquiz/index".to_string(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of passages handed to the generator.
    pub top_k: usize,
    /// Minimum cosine similarity for a passage to count as a match.
    pub min_score: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 2,
            min_score: 0.2,
        }
    }
}

/// Media transcription settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model.
    pub model: String,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// Optional language hint (ISO-639-1).
    pub language: Option<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            chunk_duration_seconds: 600,
            language: None,
        }
    }
}

/// Key-point summary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Characters of the first page sent to the summary prompt.
    pub max_chars: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self { max_chars: 2000 }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::QuizError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glassquiz")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded vector index directory.
    pub fn index_dir(&self) -> PathBuf {
        Self::expand_path(&self.index.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.chunk_size, 1000);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.retrieval.top_k, 2);
        assert_eq!(settings.summary.max_chars, 2000);
        assert_eq!(settings.llm.provider, LlmProvider::OpenAI);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            provider = "ollama"

            [retrieval]
            top_k = 4
            "#,
        )
        .unwrap();

        assert_eq!(settings.llm.provider, LlmProvider::Ollama);
        assert_eq!(settings.llm.ollama_url, "http://localhost:11434");
        assert_eq!(settings.retrieval.top_k, 4);
        assert!((settings.retrieval.min_score - 0.2).abs() < f32::EPSILON);
        assert_eq!(settings.index.provider, IndexProvider::Sqlite);
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("facade".parse::<LlmProvider>().unwrap(), LlmProvider::Mock);
        assert_eq!("hash".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::Hash);
        assert_eq!("memory".parse::<IndexProvider>().unwrap(), IndexProvider::Memory);
        assert!("chroma".parse::<IndexProvider>().is_err());
        assert_eq!(LlmProvider::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.llm.provider = LlmProvider::Mock;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.llm.provider, LlmProvider::Mock);
    }
}

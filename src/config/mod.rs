//! Configuration module for glassquiz.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QuizPrompts, SummaryPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, IndexProvider,
    IndexSettings, LlmProvider, LlmSettings, PromptSettings, RetrievalSettings, Settings,
    SummarySettings, TranscriptionSettings,
};

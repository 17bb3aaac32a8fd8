//! Prompt templates for glassquiz.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub quiz: QuizPrompts,
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt for quiz question generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizPrompts {
    pub template: String,
}

impl Default for QuizPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are an expert teacher who writes exam questions.

TEACHING CONTEXT:
{{context}}

TASK: Write one multiple-choice question about "{{topic}}".

REASONING INSTRUCTIONS (CHAIN OF THOUGHT):
Before writing the question, think step by step:
1. ANALYSIS: Find a key sentence in the context that states a verifiable fact.
2. WORDING: Write a question based only on that sentence.
3. DISTRACTORS: Invent 3 wrong answers that are plausible but clearly false according to the context.
4. VERIFICATION: Is the answer stated explicitly in the context? If not, start over.

OUTPUT FORMAT (JSON ONLY):
{
    "raisonnement_cot": "Step 1: I chose the sentence... Step 2: The question is about... Step 3: I checked that...",
    "question": "...",
    "options": ["...", "...", "...", "..."],
    "reponse_correcte": "The exact text of the correct option",
    "explication": "...",
    "citation_source": "The exact sentence from the context that was used."
}"#
            .to_string(),
        }
    }
}

/// Prompt for the key-point summary shown after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub template: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are a teaching expert. Summarize the following text as 3 factual key points, written as a short bulleted list.

TEXT: {{text}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let quiz_path = custom_path.join("quiz.toml");
            if quiz_path.exists() {
                let content = std::fs::read_to_string(&quiz_path)?;
                prompts.quiz = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Render the quiz prompt for a topic and its retrieved context.
    pub fn quiz_prompt(&self, topic: &str, context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic.to_string());
        vars.insert("context".to_string(), context.to_string());
        self.render_with_custom(&self.quiz.template, &vars)
    }

    /// Render the key-point summary prompt.
    pub fn summary_prompt(&self, text: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("text".to_string(), text.to_string());
        self.render_with_custom(&self.summary.template, &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.quiz.template.contains("{{context}}"));
        assert!(prompts.quiz.template.contains("reponse_correcte"));
        assert!(prompts.summary.template.contains("{{text}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_quiz_prompt_embeds_topic_and_context() {
        let prompts = Prompts::default();
        let prompt = prompts.quiz_prompt("photosynthesis", "Plants convert light into sugar.");
        assert!(prompt.contains("\"photosynthesis\""));
        assert!(prompt.contains("Plants convert light into sugar."));
        assert!(!prompt.contains("{{topic}}"));
    }

    #[test]
    fn test_custom_variables_are_overridden_by_call_vars() {
        let mut custom = HashMap::new();
        custom.insert("topic".to_string(), "ignored".to_string());
        custom.insert("audience".to_string(), "first-year students".to_string());

        let mut prompts = Prompts::default();
        prompts.variables = custom;
        prompts.quiz.template = "{{topic}} for {{audience}}".to_string();

        assert_eq!(prompts.quiz_prompt("cells", ""), "cells for first-year students");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("summary.toml"),
            "template = \"Key ideas of: {{text}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.summary_prompt("abc"), "Key ideas of: abc");
        assert!(prompts.quiz.template.contains("{{topic}}"));
    }
}

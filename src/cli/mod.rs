//! CLI module for glassquiz.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// glassquiz - Glass-box quizzes from your course material
///
/// Turns a PDF, text file or recorded lecture into multiple-choice questions,
/// each backed by the passage it was drawn from.
#[derive(Parser, Debug)]
#[command(name = "glassquiz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Index a document (replacing the previous one) and show its key points
    Ingest {
        /// PDF, text/Markdown, audio or video file
        file: String,
    },

    /// Index a document, then quiz yourself on it interactively
    Quiz {
        /// PDF, text/Markdown, audio or video file
        file: String,
    },

    /// Generate one question from the indexed document
    Question {
        /// Topic to ask about
        topic: String,

        /// Print the quiz record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the passages retrieved for a topic
    Search {
        /// Topic to search for
        topic: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question_command() {
        let cli = Cli::parse_from(["glassquiz", "-vv", "question", "photosynthesis", "--json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Question { topic, json } => {
                assert_eq!(topic, "photosynthesis");
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_subcommand() {
        let cli = Cli::parse_from(["glassquiz", "--config", "/tmp/q.toml", "config", "path"]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/q.toml"));
        assert!(matches!(cli.command, Commands::Config { action: ConfigAction::Path }));
    }
}

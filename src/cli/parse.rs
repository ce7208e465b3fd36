//! CLI parse: clap types for quizforge. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// quizforge - tiered question generation grounded in curriculum material
#[derive(Parser)]
#[command(name = "quizforge")]
#[command(about = "Generate, store, and illustrate tiered quiz questions with an LLM")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load subjects, topics, and documents from a JSON seed file
    Import {
        /// Seed file: {"subjects": [...], "topics": [...], "documents": [...]}
        file: PathBuf,
    },
    /// Show a topic's counters, mode eligibility, and crib
    Topic {
        /// Topic id
        topic_id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Generate questions for a topic and save them
    Generate {
        /// Topic id
        #[arg(long)]
        topic: String,
        /// Number of easy questions
        #[arg(long, default_value = "0")]
        easy: u32,
        /// Number of medium questions
        #[arg(long, default_value = "0")]
        medium: u32,
        /// Number of hard questions
        #[arg(long, default_value = "0")]
        hard: u32,
        /// Grounding mode (auto, text, pdf)
        #[arg(long, default_value = "auto")]
        mode: String,
        /// Target language (default from config)
        #[arg(long)]
        language: Option<String>,
        /// Free-text note passed to the model
        #[arg(long)]
        comment: Option<String>,
        /// Author id recorded on saved items
        #[arg(long)]
        author: String,
    },
    /// List saved items for a topic, newest first
    Items {
        /// Topic id
        #[arg(long)]
        topic: String,
        /// Maximum number of items
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Generate a visual scene description for a question
    Visual {
        /// Scene mode (3d or 2d)
        #[arg(long, default_value = "3d")]
        mode: String,
        /// Question text to illustrate
        #[arg(long)]
        question: String,
        /// Subject name
        #[arg(long)]
        subject: Option<String>,
        /// Topic name
        #[arg(long)]
        topic: Option<String>,
        /// Language for titles and labels
        #[arg(long)]
        language: Option<String>,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the effective configuration
    Validate,
}

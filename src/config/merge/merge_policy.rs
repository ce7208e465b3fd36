//! Merge rules: built-in defaults beneath every file and environment source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use std::path::PathBuf;

/// Store location: the platform data directory, else `.quizforge/store`.
pub fn default_store_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "quizforge")
        .map(|dirs| dirs.data_dir().join("store"))
        .unwrap_or_else(|| PathBuf::from(".quizforge/store"))
}

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("provider.provider_type", "ollama")?
        .set_default("provider.model", "llama3.1")?
        .set_default(
            "storage.store_path",
            default_store_path().to_string_lossy().to_string(),
        )?
        .set_default("generation.default_language", "en")?
        .set_default("generation.action_name", "generate_questions")
}

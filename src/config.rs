//! Configuration
//!
//! Layered configuration for the provider, the record store, and generation defaults.
//! Sources, lowest to highest precedence: built-in defaults, the global config file, the
//! workspace `config/` files, then `QUIZFORGE_*` environment variables.

use crate::dedup::MAX_DEDUP_HINTS;
use crate::error::ApiError;
use crate::logging::{LogFormat, LogOutput, LoggingConfig};
use crate::provider::{CompletionOptions, ModelProvider};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

pub use facade::ConfigLoader;
pub use merge::merge_policy::default_store_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
    #[serde(rename = "local")]
    LocalCustom,
}

impl ProviderType {
    pub fn parse(type_str: &str) -> Result<Self, ApiError> {
        match type_str {
            "openai" => Ok(ProviderType::OpenAI),
            "anthropic" => Ok(ProviderType::Anthropic),
            "ollama" => Ok(ProviderType::Ollama),
            "local" => Ok(ProviderType::LocalCustom),
            _ => Err(ApiError::ConfigError(format!(
                "Invalid provider type: {}. Must be openai, anthropic, ollama, or local",
                type_str
            ))),
        }
    }

    /// Environment variable consulted when no key is configured.
    pub fn api_key_env_var(self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderType::Ollama | ProviderType::LocalCustom => None,
        }
    }
}

/// Model provider selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override; required for `local`
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider_type() -> ProviderType {
    ProviderType::Ollama
}

fn default_model() -> String {
    "llama3.1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            model: default_model(),
            api_key: None,
            endpoint: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ProviderSettings {
    /// Configured key, else the provider's conventional environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                self.provider_type
                    .api_key_env_var()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| !k.trim().is_empty())
            })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("Invalid endpoint URL: {}", endpoint));
            }
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".to_string());
        }
        match self.provider_type {
            ProviderType::OpenAI | ProviderType::Anthropic => {
                if self.resolved_api_key().is_none() {
                    let var = self.provider_type.api_key_env_var().unwrap_or("api_key");
                    return Err(format!("API key missing: set provider.api_key or {}", var));
                }
            }
            ProviderType::LocalCustom => {
                if self.endpoint.is_none() {
                    return Err("Local provider requires an endpoint".to_string());
                }
            }
            ProviderType::Ollama => {}
        }
        Ok(())
    }

    pub fn to_model_provider(&self) -> Result<ModelProvider, ApiError> {
        let model = self.model.clone();
        let missing_key = || {
            ApiError::ProviderNotConfigured(format!(
                "No API key for {:?} provider",
                self.provider_type
            ))
        };
        Ok(match self.provider_type {
            ProviderType::OpenAI => ModelProvider::OpenAI {
                model,
                api_key: self.resolved_api_key().ok_or_else(missing_key)?,
                base_url: self.endpoint.clone(),
            },
            ProviderType::Anthropic => ModelProvider::Anthropic {
                model,
                api_key: self.resolved_api_key().ok_or_else(missing_key)?,
            },
            ProviderType::Ollama => ModelProvider::Ollama {
                model,
                base_url: self.endpoint.clone(),
            },
            ProviderType::LocalCustom => ModelProvider::LocalCustom {
                model,
                endpoint: self.endpoint.clone().ok_or_else(|| {
                    ApiError::ProviderNotConfigured(
                        "Local provider requires an endpoint".to_string(),
                    )
                })?,
                api_key: self.api_key.clone(),
            },
        })
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..CompletionOptions::default()
        }
    }
}

/// Storage paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Read source documents from this directory instead of the store
    #[serde(default)]
    pub documents_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            documents_dir: None,
        }
    }
}

impl StorageConfig {
    /// Relative paths are taken from the workspace root.
    pub fn resolve_store_path(&self, workspace_root: &Path) -> PathBuf {
        resolve(workspace_root, &self.store_path)
    }

    pub fn resolve_documents_dir(&self, workspace_root: &Path) -> Option<PathBuf> {
        self.documents_dir
            .as_deref()
            .map(|dir| resolve(workspace_root, dir))
    }
}

fn resolve(workspace_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace_root.join(path)
    }
}

/// Defaults applied to generation requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_language")]
    pub default_language: String,

    #[serde(default = "default_dedup_limit")]
    pub dedup_limit: usize,

    /// Action name recorded in item provenance
    #[serde(default = "default_action_name")]
    pub action_name: String,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_dedup_limit() -> usize {
    MAX_DEDUP_HINTS
}

fn default_action_name() -> String {
    "generate_questions".to_string()
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            dedup_limit: default_dedup_limit(),
            action_name: default_action_name(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Provider(String),
    Storage(String),
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AppConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }

        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "Store path cannot be empty".to_string(),
            ));
        }

        if self.generation.default_language.trim().is_empty() {
            errors.push(ValidationError::Generation(
                "default_language cannot be empty".to_string(),
            ));
        }
        if self.generation.dedup_limit > MAX_DEDUP_HINTS {
            errors.push(ValidationError::Generation(format!(
                "dedup_limit must be at most {}, got {}",
                MAX_DEDUP_HINTS, self.generation.dedup_limit
            )));
        }
        if self.generation.action_name.trim().is_empty() {
            errors.push(ValidationError::Generation(
                "action_name cannot be empty".to_string(),
            ));
        }

        if let Err(e) = self.logging.format.parse::<LogFormat>() {
            errors.push(ValidationError::Logging(e.to_string()));
        }
        if let Err(e) = self.logging.output.parse::<LogOutput>() {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Like [`AppConfig::validate`], folded into one error.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))
    }
}

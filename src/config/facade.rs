//! Configuration loading entry points.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::AppConfig;
use crate::error::ApiError;
use config::{Environment, File};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "QUIZFORGE";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the layered configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<AppConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(Self::environment()).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load a single file over the defaults; environment variables still apply.
    pub fn load_from_file(path: &Path) -> Result<AppConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()))
            .add_source(Self::environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    // QUIZFORGE_PROVIDER__MODEL -> provider.model
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self
    }
}

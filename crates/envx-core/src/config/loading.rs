//! Configuration loading and merging logic.
//!
//! Missing config files are expected and skipped. A file that exists but
//! cannot be read or parsed is an error.

use crate::config::types::{Config, DefaultsConfig, DisplayConfig, EnvxConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Load configuration from the user and project config files.
///
/// # Errors
///
/// Returns an error if a present file is unreadable, malformed, or the merged
/// configuration fails validation.
pub fn load_hierarchy(config: &Config) -> Result<EnvxConfig, ConfigError> {
    let project_config = std::env::current_dir()
        .map(|dir| project_config_path(&dir))
        .ok();

    load_hierarchy_from(&config.config_file(), project_config.as_deref())
}

/// Load and merge config files from explicit locations.
pub fn load_hierarchy_from(
    user_config: &Path,
    project_config: Option<&Path>,
) -> Result<EnvxConfig, ConfigError> {
    let mut merged = EnvxConfig::default();

    if let Some(user) = load_config_file(user_config)? {
        merged = merge_configs(merged, user);
    }

    if let Some(path) = project_config
        && let Some(project) = load_config_file(path)?
    {
        merged = merge_configs(merged, project);
    }

    validate_config(&merged)?;

    Ok(merged)
}

/// Project-local config location for a working directory.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(".envx").join("config.toml")
}

/// Load a configuration file, returning `None` if it does not exist.
fn load_config_file(path: &Path) -> Result<Option<EnvxConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::IoError { source: e }),
    };

    let config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    tracing::info!(
        event = "core.config.file_loaded",
        path = %path.display()
    );

    Ok(Some(config))
}

/// Merge two configurations, with `override_config` taking precedence
/// wherever it sets a value.
pub fn merge_configs(base: EnvxConfig, override_config: EnvxConfig) -> EnvxConfig {
    EnvxConfig {
        defaults: DefaultsConfig {
            environment: override_config
                .defaults
                .environment
                .or(base.defaults.environment),
        },
        display: DisplayConfig {
            show_secrets: override_config
                .display
                .show_secrets
                .or(base.display.show_secrets),
        },
    }
}

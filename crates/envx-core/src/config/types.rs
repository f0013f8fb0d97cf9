use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime paths for envx.
///
/// Built once per invocation and handed to whatever needs the storage root.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base directory for all envx data (default: ~/.config/envx)
    pub envx_dir: PathBuf,
}

impl Config {
    /// Resolve paths from the environment (`ENVX_HOME`) and home directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit root, e.g. an isolated temp dir in tests.
    pub fn with_root(envx_dir: impl Into<PathBuf>) -> Self {
        Self {
            envx_dir: envx_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.envx_dir
    }

    /// Directory holding one `<project>.json` record per project.
    pub fn projects_dir(&self) -> PathBuf {
        self.envx_dir.join("projects")
    }

    /// User-level config file.
    pub fn config_file(&self) -> PathBuf {
        self.envx_dir.join("config.toml")
    }
}

/// User preferences loaded from TOML config files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EnvxConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl EnvxConfig {
    /// Environment used when a command is not given `--env`.
    pub fn default_environment(&self) -> &str {
        self.defaults
            .environment
            .as_deref()
            .unwrap_or(super::defaults::DEFAULT_ENVIRONMENT)
    }

    /// Whether `list` prints secret values without masking.
    pub fn show_secrets(&self) -> bool {
        self.display.show_secrets.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Environment name to fall back to. Default: "development".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_secrets: Option<bool>,
}

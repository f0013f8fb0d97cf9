//! Default values and path resolution for configuration types.

use crate::config::types::Config;
use std::path::PathBuf;

/// Environment name used when neither `--env` nor config names one.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Env var that overrides the storage root.
pub const ENVX_HOME_VAR: &str = "ENVX_HOME";

impl Default for Config {
    fn default() -> Self {
        let envx_dir = resolve_envx_dir(std::env::var(ENVX_HOME_VAR).ok(), dirs::home_dir());
        Self { envx_dir }
    }
}

/// Pick the storage root: explicit override, then `~/.config/envx`, then temp.
pub(crate) fn resolve_envx_dir(override_dir: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    match home {
        Some(home) => home.join(".config").join("envx"),
        None => {
            tracing::warn!(
                event = "core.config.home_dir_not_found",
                "Could not determine home directory - using temp directory as fallback"
            );
            std::env::temp_dir().join("envx")
        }
    }
}

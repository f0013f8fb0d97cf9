//! # Configuration System
//!
//! Two kinds of configuration:
//!
//! - [`Config`] - runtime paths (where project records live). Derived from
//!   `ENVX_HOME` or the user's home directory, never from config files.
//! - [`EnvxConfig`] - user preferences loaded from TOML, in order:
//!   1. **Hardcoded defaults**
//!   2. **User config** - `<envx dir>/config.toml`
//!   3. **Project config** - `./.envx/config.toml`
//!   4. **CLI arguments** (applied by the caller)
//!
//! ```toml
//! [defaults]
//! environment = "development"
//!
//! [display]
//! show_secrets = false
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use defaults::DEFAULT_ENVIRONMENT;
pub use types::{Config, DefaultsConfig, DisplayConfig, EnvxConfig};
pub use validation::validate_config;

impl EnvxConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy(config: &Config) -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}

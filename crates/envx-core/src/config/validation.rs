use crate::config::types::EnvxConfig;
use crate::errors::ConfigError;
use crate::validation::check_identifier;

/// Validate a merged configuration.
pub fn validate_config(config: &EnvxConfig) -> Result<(), ConfigError> {
    if let Some(env) = &config.defaults.environment
        && let Err(reason) = check_identifier(env)
    {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("defaults.environment '{}' {}", env, reason),
        });
    }

    Ok(())
}

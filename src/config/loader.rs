//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{Platform, SyncConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env(String),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env(e) => write!(f, "Environment error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: SyncConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    finish(config)
}

/// Build a configuration from defaults and the process environment.
pub fn load_from_env() -> Result<SyncConfig, ConfigError> {
    finish(SyncConfig::default())
}

fn finish(mut config: SyncConfig) -> Result<SyncConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        platform = %config.platform,
        timeout_ms = config.profile().timeout_ms,
        max_retries = config.retries.max_retries,
        "Configuration loaded"
    );

    Ok(config)
}

/// Overlay `KAROBAR_*` variables onto a configuration.
///
/// The lookup is injected so overrides can be exercised without touching the
/// real process environment.
pub fn apply_env_overrides<F>(config: &mut SyncConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(platform) = lookup("KAROBAR_PLATFORM") {
        config.platform = platform.parse::<Platform>().map_err(ConfigError::Env)?;
    }
    if let Some(project_id) = lookup("KAROBAR_PROJECT_ID") {
        config.store.project_id = project_id;
    }
    if let Some(api_key) = lookup("KAROBAR_API_KEY") {
        config.store.api_key = api_key;
    }
    if let Some(auth_domain) = lookup("KAROBAR_AUTH_DOMAIN") {
        config.store.auth_domain = auth_domain;
    }
    if let Some(data_path) = lookup("KAROBAR_DATA_PATH") {
        config.store.data_path = Some(data_path);
    }
    Ok(())
}

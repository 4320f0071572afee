//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
///
/// A missing or unparsable file is a hard error; defaults are never applied
/// over a failed parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Error when reading config file");
        e
    })?;
    let config: ServerConfig = toml::from_str(&content).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "configuration invalid");
        e
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

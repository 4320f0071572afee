//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically.
//! Returns all violations, not just the first one.

use crate::config::schema::ServerConfig;

/// A single semantic violation in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: &'static str,
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.max_request_duration.is_zero() {
        errors.push(ValidationError {
            field: "max_request_duration",
            reason: "must be positive",
        });
    }
    if config.max_body_size == 0 {
        errors.push(ValidationError {
            field: "max_body_size",
            reason: "must be positive",
        });
    }
    if config.shutdown_grace_time.is_zero() {
        errors.push(ValidationError {
            field: "shutdown_grace_time",
            reason: "must be positive",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_all_violations_reported() {
        let config = ServerConfig {
            max_request_duration: Duration::ZERO,
            max_body_size: 0,
            ..ServerConfig::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "max_request_duration");
        assert_eq!(errors[1].field, "max_body_size");
    }
}

//! Server configuration schema.
//!
//! All fields have defaults so a minimal (or absent) config file still yields
//! a usable configuration. The loaded value is immutable; replacing it means
//! constructing a new server with a new value, never mutating in place.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Process-wide server configuration, read once at startup.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Application name, attached to every request log line.
    #[serde(rename = "application")]
    pub application_name: String,

    /// Maximum duration that handling of a request can take.
    #[serde(with = "duration_secs")]
    pub max_request_duration: Duration,

    /// Maximum request body size in bytes.
    pub max_body_size: u64,

    /// Log level used when RUST_LOG is not set.
    pub log_level: String,

    /// Time waited for in-flight requests before forcing shutdown.
    /// Kubernetes defaults to 30s between SIGTERM and SIGKILL, so this
    /// should be configured shorter than that.
    #[serde(with = "duration_secs")]
    pub shutdown_grace_time: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            application_name: "rest-kit".to_string(),
            max_request_duration: Duration::from_secs(30),
            max_body_size: 1 << 20,
            log_level: "info".to_string(),
            shutdown_grace_time: Duration::from_secs(30),
        }
    }
}

/// Serde helper storing durations as (possibly fractional) seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "invalid duration: {secs} seconds"
            )));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}

//! Tracer configuration from the process environment.

use std::collections::HashMap;
use std::env;

use crate::observability::backend::TracerBackend;
use crate::observability::sampler::SamplerKind;
use crate::observability::TracerError;

/// Tag attached to every trace, defaulting to `"undefined"`.
pub const ENVIRONMENT_KEY: &str = "environment";

/// Tracer configuration, built once per process from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct TracerConfig {
    /// Name of the service reported in spans.
    pub service_name: String,
    /// Selected tracer backend.
    pub backend: TracerBackend,
    /// Host name of the tracing agent.
    pub agent_host: String,
    /// Port of the tracing agent; the backend default applies when empty.
    pub agent_port: String,
    /// Sampler kind for the tracer.
    pub sampler: SamplerKind,
    /// Configuration parameter for the sampler.
    pub sampler_value: String,
    /// Tags injected into every trace.
    pub tags: HashMap<String, String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            backend: TracerBackend::Noop,
            agent_host: "localhost".to_string(),
            agent_port: String::new(),
            sampler: SamplerKind::Constant,
            sampler_value: "true".to_string(),
            tags: HashMap::from([(
                ENVIRONMENT_KEY.to_string(),
                "undefined".to_string(),
            )]),
        }
    }
}

impl TracerConfig {
    /// Build a tracer configuration from `TRACER_*` environment variables.
    ///
    /// An unset `TRACER_SERVICE` means tracing is disabled and is not an
    /// error; a set-but-empty one fails closed. A present `TRACER_SAMPLER`
    /// must parse, and only then is `TRACER_SAMPLER_VALUE` consulted.
    pub fn from_env() -> Result<Self, TracerError> {
        let mut config = Self::default();

        match env::var("TRACER_SERVICE") {
            Err(env::VarError::NotPresent) => {
                // No tracer configured
                return Ok(config);
            }
            Ok(service) if !service.is_empty() => {
                config.backend = TracerBackend::from_name(&service);
            }
            _ => return Err(TracerError::EmptyTracerType),
        }

        if let Ok(host) = env::var("TRACER_HOST") {
            if !host.is_empty() {
                config.agent_host = host;
            }
        }

        if let Ok(kind) = env::var("TRACER_SAMPLER") {
            config.sampler = kind.parse()?;
            config.sampler_value = env::var("TRACER_SAMPLER_VALUE").unwrap_or_default();
        }

        if let Ok(tag) = env::var("TRACER_ENVIRONMENT") {
            if !tag.is_empty() {
                config.tags.insert(ENVIRONMENT_KEY.to_string(), tag);
            }
        }

        Ok(config)
    }

    /// Value of the `environment` tag.
    pub fn environment(&self) -> &str {
        self.tags
            .get(ENVIRONMENT_KEY)
            .map(String::as_str)
            .unwrap_or("undefined")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "TRACER_SERVICE",
        "TRACER_HOST",
        "TRACER_SAMPLER",
        "TRACER_SAMPLER_VALUE",
        "TRACER_ENVIRONMENT",
    ];

    fn with_env(vars: &[(&str, &str)], check: impl FnOnce()) {
        for var in VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
        check();
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_unset_service_disables_tracing() {
        with_env(&[], || {
            let config = TracerConfig::from_env().unwrap();
            assert_eq!(config.backend, TracerBackend::Noop);
            assert_eq!(config.agent_host, "localhost");
            assert_eq!(config.sampler, SamplerKind::Constant);
            assert_eq!(config.sampler_value, "true");
            assert_eq!(config.environment(), "undefined");
        });
    }

    #[test]
    #[serial]
    fn test_empty_service_fails_closed() {
        with_env(&[("TRACER_SERVICE", "")], || {
            let err = TracerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("tracer type is empty"));
        });
    }

    #[test]
    #[serial]
    fn test_backend_selection() {
        with_env(&[("TRACER_SERVICE", "jaeger")], || {
            let config = TracerConfig::from_env().unwrap();
            assert_eq!(config.backend, TracerBackend::Jaeger);
        });
        with_env(&[("TRACER_SERVICE", "datadog")], || {
            let config = TracerConfig::from_env().unwrap();
            assert_eq!(config.backend, TracerBackend::Datadog);
        });
        with_env(&[("TRACER_SERVICE", "zipkin")], || {
            // Unknown backend resolves to no-op without an error
            let config = TracerConfig::from_env().unwrap();
            assert_eq!(config.backend, TracerBackend::Noop);
        });
    }

    #[test]
    #[serial]
    fn test_host_override() {
        with_env(
            &[("TRACER_SERVICE", "jaeger"), ("TRACER_HOST", "jaeger.svc")],
            || {
                let config = TracerConfig::from_env().unwrap();
                assert_eq!(config.agent_host, "jaeger.svc");
            },
        );
        with_env(&[("TRACER_SERVICE", "jaeger"), ("TRACER_HOST", "")], || {
            let config = TracerConfig::from_env().unwrap();
            assert_eq!(config.agent_host, "localhost");
        });
    }

    #[test]
    #[serial]
    fn test_sampler_parsing() {
        with_env(
            &[
                ("TRACER_SERVICE", "datadog"),
                ("TRACER_SAMPLER", "PROBABILISTIC"),
                ("TRACER_SAMPLER_VALUE", "0.1"),
            ],
            || {
                let config = TracerConfig::from_env().unwrap();
                assert_eq!(config.sampler, SamplerKind::Probabilistic);
                assert_eq!(config.sampler_value, "0.1");
            },
        );

        // Present sampler kind must parse, even when empty
        with_env(
            &[("TRACER_SERVICE", "jaeger"), ("TRACER_SAMPLER", "")],
            || {
                assert!(TracerConfig::from_env().is_err());
            },
        );
        with_env(
            &[("TRACER_SERVICE", "datadog"), ("TRACER_SAMPLER", "invalid")],
            || {
                assert!(TracerConfig::from_env().is_err());
            },
        );

        // Sampler value is only read alongside a declared kind
        with_env(
            &[
                ("TRACER_SERVICE", "jaeger"),
                ("TRACER_SAMPLER_VALUE", "0.9"),
            ],
            || {
                let config = TracerConfig::from_env().unwrap();
                assert_eq!(config.sampler_value, "true");
            },
        );
    }

    #[test]
    #[serial]
    fn test_environment_tag() {
        with_env(&[("TRACER_SERVICE", "jaeger")], || {
            let config = TracerConfig::from_env().unwrap();
            assert_eq!(config.environment(), "undefined");
        });
        with_env(
            &[
                ("TRACER_SERVICE", "jaeger"),
                ("TRACER_ENVIRONMENT", "production"),
            ],
            || {
                let config = TracerConfig::from_env().unwrap();
                assert_eq!(config.environment(), "production");
            },
        );
    }
}

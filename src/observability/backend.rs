//! Tracer backend selection and global registration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use opentelemetry::global;
use opentelemetry_sdk::trace::SdkTracerProvider;

use crate::observability::config::TracerConfig;
use crate::observability::{datadog, jaeger, TracerError};

static GLOBAL_TRACER_SET: AtomicBool = AtomicBool::new(false);

/// Supported tracer backends.
///
/// Adding a backend means adding a variant and an `init` arm; the selector
/// does not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracerBackend {
    Noop,
    Jaeger,
    Datadog,
}

impl TracerBackend {
    /// Map a backend selector onto a variant.
    ///
    /// Unknown names resolve to no-op; emptiness has already been rejected
    /// by the environment parsing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "jaeger" => TracerBackend::Jaeger,
            "datadog" => TracerBackend::Datadog,
            _ => TracerBackend::Noop,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TracerBackend::Noop => "noop",
            TracerBackend::Jaeger => "jaeger",
            TracerBackend::Datadog => "datadog",
        }
    }

    /// Initialize the backend, yielding the provider to register.
    ///
    /// `Noop` yields no provider. Exporter failures come back as errors and
    /// never panic; the caller degrades to a no-op tracer.
    pub fn init(&self, config: &TracerConfig) -> Result<Option<SdkTracerProvider>, TracerError> {
        match self {
            TracerBackend::Noop => Ok(None),
            TracerBackend::Jaeger => jaeger::init(config).map(Some),
            TracerBackend::Datadog => datadog::init(config).map(Some),
        }
    }
}

/// Handle used to flush and tear down the tracer at process shutdown.
///
/// `close` is idempotent and safe to call on a no-op closer.
#[derive(Debug)]
pub struct TracerCloser {
    provider: Mutex<Option<SdkTracerProvider>>,
}

impl TracerCloser {
    /// Closer for the disabled-tracing case; closing it does nothing.
    pub fn noop() -> Self {
        Self {
            provider: Mutex::new(None),
        }
    }

    fn new(provider: SdkTracerProvider) -> Self {
        Self {
            provider: Mutex::new(Some(provider)),
        }
    }

    /// Flush pending spans and shut the provider down.
    ///
    /// Subsequent calls are no-ops and return `Ok`.
    pub fn close(&self) -> Result<(), TracerError> {
        // A poisoned lock means a panic mid-close; the provider state is
        // still just an Option, so recover the guard instead of panicking
        let provider = self
            .provider
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        match provider {
            Some(provider) => provider
                .shutdown()
                .map_err(|e| TracerError::Shutdown(e.to_string())),
            None => Ok(()),
        }
    }
}

/// Initialize the global tracer from the process environment.
///
/// With no backend configured this succeeds with a no-op closer. Any error
/// leaves the global provider untouched (the OpenTelemetry default records
/// nothing), so the service keeps serving traffic without tracing.
pub fn init_global_tracer(service_name: &str) -> Result<TracerCloser, TracerError> {
    let mut config = TracerConfig::from_env()?;
    config.service_name = service_name.to_string();

    let provider = match config.backend.init(&config)? {
        Some(provider) => provider,
        None => return Ok(TracerCloser::noop()),
    };

    if GLOBAL_TRACER_SET.swap(true, Ordering::SeqCst) {
        tracing::warn!(
            tracer = config.backend.name(),
            "global tracer re-initialized; replacing previous provider"
        );
    }
    global::set_tracer_provider(provider.clone());
    tracing::info!(
        tracer = config.backend.name(),
        environment = config.environment(),
        "tracer initialized"
    );

    Ok(TracerCloser::new(provider))
}

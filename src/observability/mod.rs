//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     TRACER_* environment → config.rs → backend.rs dispatch
//!         → jaeger.rs / datadog.rs (OTLP exporter + provider)
//!         → global tracer provider, closer returned to the caller
//!
//! per request:
//!     span.rs middleware → server span tagged from RequestContext
//!
//! logs:
//!     logging.rs → tracing-subscriber registry (RUST_LOG overrides config)
//! ```
//!
//! # Design Decisions
//! - Tracer init errors are non-fatal: the caller falls back to a no-op
//!   closer and the service runs without tracing
//! - Sampler construction is pure and independently testable
//! - The global provider is set at most once, before request traffic

pub mod backend;
pub mod config;
pub mod logging;
pub mod sampler;
pub mod span;

mod datadog;
mod jaeger;

pub use backend::{init_global_tracer, TracerBackend, TracerCloser};
pub use config::TracerConfig;
pub use logging::init_logging;
pub use sampler::SamplerKind;
pub use span::trace_request;

/// Errors raised while configuring or tearing down the tracer.
#[derive(Debug, thiserror::Error)]
pub enum TracerError {
    /// `TRACER_SERVICE` was set to the empty string. An explicitly empty
    /// selector is a misconfiguration, not a request for a no-op tracer.
    #[error("tracer type is empty")]
    EmptyTracerType,
    #[error("invalid tracer sampler type: {0:?}")]
    InvalidSamplerKind(String),
    #[error("failed to initialize span exporter: {0}")]
    Exporter(String),
    #[error("failed to shut down tracer: {0}")]
    Shutdown(String),
}

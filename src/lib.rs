//! HTTP middleware helpers for REST services.
//!
//! Wraps an axum router with request-scoped context and logging, a lazy
//! body-size ceiling, deadlines, access logging, panic recovery, and
//! graceful shutdown, plus environment-driven bootstrap of an OpenTelemetry
//! tracer (jaeger, datadog, or no-op).

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::{load_config, ServerConfig};
pub use http::{request_context, HttpServer, RequestContext};
pub use lifecycle::Shutdown;
pub use observability::{init_global_tracer, init_logging, trace_request, TracerCloser};

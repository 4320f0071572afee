//! rest-kit demo service.
//!
//! Wires the middleware stack around a minimal health route: logging first,
//! then configuration (optional file path as the first argument), tracer
//! bootstrap with no-op fallback, and a gracefully shutting down server.

use std::path::Path;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use rest_kit::config::{load_config, ServerConfig};
use rest_kit::http::HttpServer;
use rest_kit::observability::{init_global_tracer, init_logging, trace_request, TracerCloser};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Subscriber first so config load errors reach the log. RUST_LOG
    // overrides the default level.
    init_logging(&ServerConfig::default().log_level);

    // Config file errors are fatal; missing path means defaults
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => ServerConfig::default(),
    };

    tracing::info!(
        application = %config.application_name,
        max_body_size = config.max_body_size,
        request_timeout_secs = config.max_request_duration.as_secs_f64(),
        "Configuration loaded"
    );

    // Tracer init errors are non-fatal: serve without tracing
    let closer = init_global_tracer(&config.application_name).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "tracing disabled");
        TracerCloser::noop()
    });

    let routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .layer(axum::middleware::from_fn(trace_request));

    let listener = TcpListener::bind("0.0.0.0:8080").await?;
    let server = HttpServer::new(config, routes);
    server.run(listener).await?;

    closer.close()?;
    tracing::info!("Shutdown complete");
    Ok(())
}

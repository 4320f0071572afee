//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap user routes with the middleware chain (lifecycle, recovery,
//!   access log)
//! - Serve plain or TLS listeners
//! - Graceful shutdown on SIGINT/SIGTERM, bounded by the grace time

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::net::TcpListener;
use tower::ServiceBuilder;

use crate::config::ServerConfig;
use crate::http::middleware::recovery::install_panic_hook;
use crate::http::middleware::{access_log, init_request, recover_panics};
use crate::lifecycle::{spawn_grace_watchdog, terminate_signal, Shutdown};

/// HTTP server for a REST service.
///
/// Owns the configuration and the fully layered router.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
}

impl HttpServer {
    /// Wrap the given routes with the middleware chain.
    pub fn new(config: ServerConfig, routes: Router) -> Self {
        install_panic_hook();
        let config = Arc::new(config);
        let router = Self::build_router(&config, routes);
        Self { router, config }
    }

    /// Apply the middleware layers, outermost first.
    fn build_router(config: &Arc<ServerConfig>, routes: Router) -> Router {
        routes.layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(config.clone(), init_request))
                .layer(from_fn(recover_panics))
                .layer(from_fn(access_log)),
        )
    }

    /// The assembled router, for driving the stack directly in tests.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Listens for SIGINT/SIGTERM and drains in-flight requests within the
    /// configured grace time; an overrunning drain terminates the process.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let shutdown = Shutdown::new();
        let mut drain_rx = shutdown.subscribe();
        let watchdog =
            spawn_grace_watchdog(shutdown.subscribe(), self.config.shutdown_grace_time);
        tokio::spawn(async move {
            terminate_signal().await;
            tracing::info!("Shutting down server...");
            shutdown.trigger();
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.recv().await;
            })
            .await?;

        watchdog.abort();
        tracing::info!("Server gracefully stopped");
        Ok(())
    }

    /// Run the server over TLS.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        cert_path: &Path,
        key_path: &Path,
    ) -> std::io::Result<()> {
        let tls = RustlsConfig::from_pem_file(cert_path, key_path).await?;
        tracing::info!(address = %addr, "HTTPS server starting");

        let grace = self.config.shutdown_grace_time;
        let shutdown = Shutdown::new();
        let watchdog = spawn_grace_watchdog(shutdown.subscribe(), grace);
        let handle = Handle::new();
        let drain_handle = handle.clone();
        tokio::spawn(async move {
            terminate_signal().await;
            tracing::info!("Shutting down server...");
            shutdown.trigger();
            drain_handle.graceful_shutdown(Some(grace));
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;

        watchdog.abort();
        tracing::info!("Server gracefully stopped");
        Ok(())
    }
}

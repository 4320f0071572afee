//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum setup, graceful serve)
//!     → middleware/lifecycle.rs (body ceiling, request id, span, deadline)
//!     → middleware/recovery.rs (panic boundary)
//!     → middleware/access_log.rs (Starting/Finished)
//!     → user handler (reads context.rs, may start trace spans)
//! ```

pub mod context;
pub mod middleware;
pub mod server;

pub use context::{request_context, ContextError, RequestContext};
pub use middleware::X_REQUEST_ID;
pub use server::HttpServer;

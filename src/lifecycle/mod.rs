//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//!
//! Shutdown (shutdown.rs):
//!     trigger → stop accepting → drain in-flight requests
//!     grace time elapsed with drain unfinished → fatal, forced exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{spawn_grace_watchdog, Shutdown};
pub use signals::terminate_signal;

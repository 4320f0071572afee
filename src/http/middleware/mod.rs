//! Middleware chain for inbound requests.
//!
//! Execution order per request:
//! lifecycle (context, logger, deadline, body ceiling)
//!     → recovery (panic boundary)
//!     → access log (Starting/Finished)
//!     → handler

pub mod access_log;
pub mod lifecycle;
pub mod recovery;

pub use access_log::access_log;
pub use lifecycle::{init_request, X_REQUEST_ID};
pub use recovery::recover_panics;

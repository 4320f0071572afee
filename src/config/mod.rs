//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc with the server and middleware
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no partial mutation, no global
//! - All fields have defaults to allow minimal configs
//! - Missing or unparsable file is a hard error with no fallback to defaults

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ServerConfig;

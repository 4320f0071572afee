//! Network address helpers.

pub mod forwarded;

pub use forwarded::client_ip;

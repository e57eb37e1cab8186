//! Common error types for robolink.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The host/port pair cannot address a robot server.
    #[error("invalid endpoint {host}:{port}: {reason}")]
    InvalidEndpoint {
        /// The rejected host.
        host: String,
        /// The rejected port.
        port: u16,
        /// Why the pair was rejected.
        reason: &'static str,
    },
}

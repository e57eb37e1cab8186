//! HTTP transport to the robot server.
//!
//! The control core never talks HTTP directly. It goes through the
//! [`Transport`] trait, and builds one transport per connection session
//! through a [`TransportFactory`], so switching endpoints never mutates a
//! shared client.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  Control core    │────▶│ TransportFactory │  (one transport per session)
//! └────────┬─────────┘     └────────┬─────────┘
//!          │                        │ create(endpoint)
//!          ▼                        ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │    Transport     │◀────│  HttpTransport   │
//! │    (trait)       │     │  (reqwest)       │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │ HTTP
//!                          ┌────────▼─────────┐
//!                          │   Robot server   │
//!                          └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::sync::Arc;

use async_trait::async_trait;
use robolink_core::{Command, ControlResponse, Endpoint, StatusSnapshot};

pub mod config;
pub mod error;
pub mod http;

pub use config::TransportConfig;
pub use error::{Result, TransportError};
pub use http::{HttpTransport, HttpTransportFactory, SEQUENCE_HEADER};

/// Request/response exchange with one robot server.
///
/// This trait abstracts the HTTP client, allowing for in-memory
/// implementations in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The endpoint this transport talks to.
    fn endpoint(&self) -> &Endpoint;

    /// Send a direction, actuator, or stop command.
    ///
    /// # Errors
    ///
    /// Returns an error if the robot is unreachable, answers with a
    /// non-success status, or answers with an empty or unparsable body.
    async fn send_command(&self, command: &Command) -> Result<ControlResponse>;

    /// Send a liveness ping.
    ///
    /// # Errors
    ///
    /// Returns an error if the robot is unreachable or answers with a
    /// non-success status.
    async fn heartbeat(&self) -> Result<()>;

    /// Fetch the current status snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the robot is unreachable, answers with a
    /// non-success status, or the snapshot cannot be parsed.
    async fn status(&self) -> Result<StatusSnapshot>;
}

/// Builds a fresh [`Transport`] for an endpoint.
pub trait TransportFactory: Send + Sync {
    /// Create a transport bound to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport can be built for the endpoint.
    fn create(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>>;
}

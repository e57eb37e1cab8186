//! Connection lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//!     ┌──────────────┐   connect    ┌──────────────┐
//!     │ Disconnected │─────────────▶│  Connecting  │
//!     └──────────────┘              └──────┬───────┘
//!            ▲                             │
//!            │ disconnect        ok ┌──────┴──────┐ failed
//!            │                      ▼             ▼
//!            │              ┌─────────────┐  ┌─────────┐
//!            ├──────────────│  Connected  │─▶│  Error  │
//!            │              └─────────────┘  └────┬────┘
//!            │                     ▲   next ok    │
//!            │                     └──────────────┤
//!            └────────────────────────────────────┘
//! ```
//!
//! `Error` may also go straight back to `Connecting` when the operator
//! reconnects.

use std::fmt;

use serde::Serialize;

use crate::error::{ControlError, Result};

/// Lifecycle phase of the link to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionPhase {
    /// No session. Nothing is sent to the robot.
    #[default]
    Disconnected,
    /// A session is being established.
    Connecting,
    /// Session live and the robot is answering.
    Connected,
    /// Session live but the last operation against the robot failed.
    Error,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Validates a transition and returns the target phase if it is allowed.
///
/// # Errors
///
/// Returns `ControlError::InvalidTransition` if the transition is not allowed.
pub fn validate_transition(from: ConnectionPhase, to: ConnectionPhase) -> Result<ConnectionPhase> {
    if is_valid_transition(from, to) {
        Ok(to)
    } else {
        Err(ControlError::InvalidTransition { from, to })
    }
}

/// Check if a phase transition is allowed.
#[must_use]
pub const fn is_valid_transition(from: ConnectionPhase, to: ConnectionPhase) -> bool {
    use ConnectionPhase::{Connected, Connecting, Disconnected, Error};

    matches!(
        (from, to),
        (Disconnected | Error, Connecting)
            | (Connecting | Error, Connected)
            | (Connecting | Connected, Error)
            | (Connecting | Connected | Error, Disconnected)
    )
}

/// Returns the list of phases reachable from `phase` in one step.
#[must_use]
pub fn valid_transitions_from(phase: ConnectionPhase) -> Vec<ConnectionPhase> {
    use ConnectionPhase::{Connected, Connecting, Disconnected, Error};

    match phase {
        Disconnected => vec![Connecting],
        Connecting => vec![Connected, Error, Disconnected],
        Connected => vec![Error, Disconnected],
        Error => vec![Connecting, Connected, Disconnected],
    }
}

/// Returns true if a transport session exists in this phase.
///
/// Commands are only dispatched while a session is live. `Error` still holds
/// its transport so the next successful call can recover.
#[must_use]
pub const fn has_session(phase: ConnectionPhase) -> bool {
    matches!(phase, ConnectionPhase::Connected | ConnectionPhase::Error)
}

//! Error types for the control core.
//!
//! Transport failures never surface here: they are folded into
//! [`ControlState`](crate::ControlState) as the ERROR phase.

use thiserror::Error;

use crate::lifecycle::ConnectionPhase;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur when talking to the control state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// The state machine has shut down and no longer accepts requests.
    #[error("control state machine is not running")]
    MachineStopped,

    /// A lifecycle transition was requested that the state machine forbids.
    #[error("invalid connection transition from {from} to {to}")]
    InvalidTransition {
        /// Phase before the transition.
        from: ConnectionPhase,
        /// Requested phase.
        to: ConnectionPhase,
    },
}

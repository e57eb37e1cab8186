//! Operator commands.
//!
//! A command is three steps: the writer applies its local effects and
//! sequences it, the round trip runs on the caller's task, and the writer
//! folds the result back in. Other commands and the monitors run
//! concurrently with the round trip.

use robolink_core::{Actuator, ControlResponse, Direction};
use robolink_transport::TransportError;

use crate::machine::Intent;
use crate::writer::ControlHandle;

/// What happened to a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The robot acknowledged the command.
    Delivered(ControlResponse),
    /// The round trip failed. The state is now ERROR.
    Failed(TransportError),
    /// A newer command on the same channel, or a reconnect, made this
    /// result irrelevant. It had no effect on the state.
    Superseded,
    /// No live session. Nothing was sent.
    NoSession,
    /// The state machine has shut down.
    MachineStopped,
}

impl DispatchOutcome {
    /// Returns true if the robot acknowledged the command.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Turns operator intents into robot commands.
#[derive(Clone)]
pub struct CommandDispatcher {
    handle: ControlHandle,
}

impl CommandDispatcher {
    pub(crate) const fn new(handle: ControlHandle) -> Self {
        Self { handle }
    }

    /// Start moving in `direction`. Pressing `Stop` is an emergency stop.
    pub async fn press_direction(&self, direction: Direction) -> DispatchOutcome {
        self.dispatch(Intent::Press(direction)).await
    }

    /// Stop moving in the currently held direction.
    pub async fn release_direction(&self) -> DispatchOutcome {
        self.dispatch(Intent::Release).await
    }

    /// Engage `actuator`.
    pub async fn activate_actuator(&self, actuator: Actuator) -> DispatchOutcome {
        self.dispatch(Intent::Activate(actuator)).await
    }

    /// Release `actuator`.
    pub async fn release_actuator(&self, actuator: Actuator) -> DispatchOutcome {
        self.dispatch(Intent::Deactivate(actuator)).await
    }

    /// Halt the vehicle unconditionally.
    pub async fn emergency_stop(&self) -> DispatchOutcome {
        self.dispatch(Intent::EmergencyStop).await
    }

    async fn dispatch(&self, intent: Intent) -> DispatchOutcome {
        let prepared = match self.handle.prepare(intent).await {
            Ok(Some(prepared)) => prepared,
            Ok(None) => return DispatchOutcome::NoSession,
            Err(_) => return DispatchOutcome::MachineStopped,
        };

        let result = prepared
            .transport
            .send_command(&prepared.pending.command)
            .await;

        self.handle
            .complete(prepared.pending, result)
            .await
            .unwrap_or(DispatchOutcome::MachineStopped)
    }
}

//! The observable control state.

use chrono::{DateTime, Utc};
use robolink_core::{Actuator, Direction, Endpoint, Sequence, StatusSnapshot};
use serde::Serialize;

use crate::lifecycle::ConnectionPhase;
use crate::stop_reason::StopReason;

/// Message shown before any connection has been made, and after a disconnect.
pub const NOT_CONNECTED_MESSAGE: &str =
    "not connected to a robot; set the robot host and port and connect.";

/// Diagnostic recorded when `operation` fails against `endpoint`.
#[must_use]
pub fn unreachable_message(endpoint: &Endpoint, operation: &str) -> String {
    format!("failed to reach {endpoint} while executing {operation}.")
}

/// Engagement flags for the auxiliary actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActuatorStates {
    /// Brake engaged.
    pub brake: bool,
    /// Horn sounding.
    pub horn: bool,
}

impl ActuatorStates {
    /// Whether `actuator` is engaged.
    #[must_use]
    pub const fn is_engaged(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Brake => self.brake,
            Actuator::Horn => self.horn,
        }
    }

    /// Set the flag for `actuator`.
    pub fn set(&mut self, actuator: Actuator, engaged: bool) {
        match actuator {
            Actuator::Brake => self.brake = engaged,
            Actuator::Horn => self.horn = engaged,
        }
    }
}

/// Snapshot of everything the operator sees.
///
/// Snapshots are immutable once published. Each published snapshot carries a
/// strictly larger `revision` than the one before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlState {
    /// Lifecycle phase.
    pub phase: ConnectionPhase,
    /// Whether the robot answered the most recent operation.
    pub connected: bool,
    /// Direction currently held. `Stop` when idle.
    pub current_direction: Direction,
    /// Actuator flags.
    pub actuators: ActuatorStates,
    /// Most recently issued sequence number in this session.
    pub last_sequence: Option<Sequence>,
    /// Why the vehicle is stopped.
    pub stop_reason: StopReason,
    /// Human-readable diagnostic, present while something is wrong.
    pub error_message: Option<String>,
    /// True while a connect attempt is in flight.
    pub loading: bool,
    /// Robot the current (or next) session targets.
    pub endpoint: Endpoint,
    /// Last telemetry reported by the robot.
    pub telemetry: Option<StatusSnapshot>,
    /// When `telemetry` was received.
    pub last_status_at: Option<DateTime<Utc>>,
    /// Session counter. Bumped on every connect and disconnect.
    pub session: u64,
    /// Publication counter.
    pub revision: u64,
}

impl ControlState {
    /// Initial state targeting `endpoint`.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            phase: ConnectionPhase::Disconnected,
            connected: false,
            current_direction: Direction::Stop,
            actuators: ActuatorStates::default(),
            last_sequence: None,
            stop_reason: StopReason::None,
            error_message: Some(NOT_CONNECTED_MESSAGE.to_string()),
            loading: false,
            endpoint,
            telemetry: None,
            last_status_at: None,
            session: 0,
            revision: 0,
        }
    }

    /// Compare everything except `revision`.
    pub(crate) fn same_content(&self, other: &Self) -> bool {
        let mut other = other.clone();
        other.revision = self.revision;
        *self == other
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(Endpoint::default())
    }
}

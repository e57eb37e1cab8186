//! Synchronous core of the control state machine.
//!
//! [`Machine`] folds every event (a connect, a command being prepared or
//! completing, a monitor tick) into [`ControlState`]. It performs no I/O and
//! is owned by exactly one writer task, so every mutation is serialized.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use robolink_core::{
    Actuator, Command, CommandKind, ControlResponse, Direction, Endpoint, Sequence, StatusSnapshot,
};
use robolink_transport::{Transport, TransportError};

use crate::dispatcher::DispatchOutcome;
use crate::lifecycle::{self, ConnectionPhase};
use crate::sequencer::CommandSequencer;
use crate::state::{unreachable_message, ActuatorStates, ControlState, NOT_CONNECTED_MESSAGE};
use crate::stop_reason::StopReasonUpdate;

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Intent {
    Press(Direction),
    Release,
    Activate(Actuator),
    Deactivate(Actuator),
    EmergencyStop,
}

/// A command that has been sequenced and is waiting for its result.
#[derive(Debug, Clone)]
pub(crate) struct Pending {
    pub(crate) session: u64,
    pub(crate) intent: Intent,
    pub(crate) command: Command,
}

/// A pending command together with the transport to send it on.
pub(crate) struct Prepared {
    pub(crate) pending: Pending,
    pub(crate) transport: Arc<dyn Transport>,
}

/// Independent ordering domains. Completions are only compared against
/// earlier completions on the same channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Channel {
    Motion,
    Actuator(Actuator),
}

impl Channel {
    const fn of(kind: CommandKind) -> Option<Self> {
        match kind {
            CommandKind::DirectionOn(_) | CommandKind::DirectionOff(_) => Some(Self::Motion),
            CommandKind::ActuatorOn(a) | CommandKind::ActuatorOff(a) => Some(Self::Actuator(a)),
            CommandKind::Stop => None,
        }
    }
}

pub(crate) struct Machine {
    state: ControlState,
    sequencer: CommandSequencer,
    transport: Option<Arc<dyn Transport>>,
    applied: HashMap<Channel, u64>,
}

impl Machine {
    pub(crate) fn new(endpoint: Endpoint) -> Self {
        Self {
            state: ControlState::new(endpoint),
            sequencer: CommandSequencer::new(),
            transport: None,
            applied: HashMap::new(),
        }
    }

    pub(crate) const fn state(&self) -> &ControlState {
        &self.state
    }

    /// Bump the revision ahead of a publication.
    pub(crate) fn next_revision(&mut self) -> &ControlState {
        self.state.revision += 1;
        &self.state
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Tear down any current session and enter CONNECTING for `endpoint`.
    ///
    /// Returns the previous session's transport so the caller can send it a
    /// best-effort stop.
    pub(crate) fn begin_connect(&mut self, endpoint: Endpoint) -> Option<Arc<dyn Transport>> {
        let previous = self.end_session();

        self.state.session += 1;
        self.sequencer.reset();
        self.applied.clear();
        self.state.last_sequence = None;
        self.state.endpoint = endpoint;
        self.state.loading = true;
        self.state.error_message = None;
        self.transition(ConnectionPhase::Connecting);

        tracing::info!(
            endpoint = %self.state.endpoint,
            session = self.state.session,
            "Connecting to robot"
        );
        previous
    }

    /// Finish the connect started by [`begin_connect`](Self::begin_connect).
    ///
    /// Returns the live transport when the session is up.
    pub(crate) fn finish_connect(
        &mut self,
        result: robolink_transport::Result<Arc<dyn Transport>>,
    ) -> Option<Arc<dyn Transport>> {
        self.state.loading = false;
        match result {
            Ok(transport) => {
                self.transport = Some(Arc::clone(&transport));
                self.state.connected = true;
                self.state.error_message = None;
                self.transition(ConnectionPhase::Connected);
                tracing::info!(
                    endpoint = %self.state.endpoint,
                    session = self.state.session,
                    "Connected to robot"
                );
                Some(transport)
            }
            Err(e) => {
                self.mark_unreachable("connect", &e);
                None
            }
        }
    }

    /// Drop the current session, if any.
    ///
    /// Resets the held direction and returns the released transport.
    pub(crate) fn end_session(&mut self) -> Option<Arc<dyn Transport>> {
        if self.state.phase == ConnectionPhase::Disconnected {
            return None;
        }

        let transport = self.transport.take();
        self.state.session += 1;
        self.state.connected = false;
        self.state.loading = false;
        self.state.current_direction = Direction::Stop;
        self.state.actuators = ActuatorStates::default();
        self.state.error_message = Some(NOT_CONNECTED_MESSAGE.to_string());
        self.transition(ConnectionPhase::Disconnected);

        tracing::info!(endpoint = %self.state.endpoint, "Disconnected from robot");
        transport
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Apply the local effects of `intent` and sequence its command.
    ///
    /// Returns `None` when there is no live session. Emergency stop and
    /// release still reset the held direction in that case.
    pub(crate) fn prepare(&mut self, intent: Intent) -> Option<Prepared> {
        let Some(transport) = self.live_transport() else {
            if matches!(intent, Intent::Release | Intent::EmergencyStop) {
                self.state.current_direction = Direction::Stop;
            }
            tracing::debug!(?intent, "No session, command not sent");
            return None;
        };

        let kind = match intent {
            Intent::Press(direction) if direction.is_moving() => {
                self.state.current_direction = direction;
                self.update_stop_reason(StopReasonUpdate::MovementRequested);
                CommandKind::DirectionOn(direction)
            }
            Intent::Press(_) | Intent::EmergencyStop => {
                self.state.current_direction = Direction::Stop;
                CommandKind::Stop
            }
            Intent::Release => {
                let held = self.state.current_direction;
                self.state.current_direction = Direction::Stop;
                if held.is_moving() {
                    CommandKind::DirectionOff(held)
                } else {
                    CommandKind::Stop
                }
            }
            Intent::Activate(actuator) => {
                self.state.actuators.set(actuator, true);
                CommandKind::ActuatorOn(actuator)
            }
            Intent::Deactivate(actuator) => {
                self.state.actuators.set(actuator, false);
                CommandKind::ActuatorOff(actuator)
            }
        };
        let command = Command {
            kind,
            sequence: kind.is_sequenced().then(|| self.issue()),
        };

        tracing::debug!(
            command = %command,
            session = self.state.session,
            "Dispatching command"
        );

        Some(Prepared {
            pending: Pending {
                session: self.state.session,
                intent,
                command,
            },
            transport,
        })
    }

    /// Fold the result of a dispatched command into the state.
    pub(crate) fn complete(
        &mut self,
        pending: &Pending,
        result: robolink_transport::Result<ControlResponse>,
    ) -> DispatchOutcome {
        if pending.session != self.state.session {
            tracing::debug!(command = %pending.command, "Discarding result from an old session");
            return DispatchOutcome::Superseded;
        }

        if let (Some(channel), Some(sequence)) =
            (Channel::of(pending.command.kind), pending.command.sequence)
        {
            let applied = self.applied.entry(channel).or_default();
            if sequence.get() <= *applied {
                tracing::debug!(
                    command = %pending.command,
                    applied = *applied,
                    "Discarding late command result"
                );
                return DispatchOutcome::Superseded;
            }
            *applied = sequence.get();
        }

        match result {
            Ok(response) => {
                self.recover();
                if pending.intent == Intent::Activate(Actuator::Brake) {
                    self.update_stop_reason(StopReasonUpdate::BrakeEngaged);
                }
                DispatchOutcome::Delivered(response)
            }
            Err(e) => {
                self.mark_unreachable(&pending.command.path(), &e);
                self.roll_back(pending.intent);
                DispatchOutcome::Failed(e)
            }
        }
    }

    fn roll_back(&mut self, intent: Intent) {
        match intent {
            Intent::Press(direction) if self.state.current_direction == direction => {
                self.state.current_direction = Direction::Stop;
            }
            Intent::Activate(actuator) => self.state.actuators.set(actuator, false),
            Intent::Deactivate(actuator) => self.state.actuators.set(actuator, true),
            Intent::Press(_) | Intent::Release | Intent::EmergencyStop => {}
        }
    }

    /// Dismiss the current diagnostic. The connection phase is unchanged.
    pub(crate) fn clear_error(&mut self) {
        self.state.error_message = None;
    }

    pub(crate) fn update_stop_reason(&mut self, update: StopReasonUpdate) {
        self.state.stop_reason = self.state.stop_reason.apply(update);
    }

    // =========================================================================
    // Monitors
    // =========================================================================

    pub(crate) fn observe_heartbeat(
        &mut self,
        session: u64,
        result: robolink_transport::Result<()>,
    ) {
        if !self.is_current(session) {
            return;
        }
        match result {
            Ok(()) => self.recover(),
            Err(e) => self.mark_unreachable("heartbeat", &e),
        }
    }

    pub(crate) fn observe_status(
        &mut self,
        session: u64,
        result: robolink_transport::Result<StatusSnapshot>,
        now: DateTime<Utc>,
    ) {
        if !self.is_current(session) {
            return;
        }
        match result {
            Ok(snapshot) => {
                self.state.telemetry = Some(snapshot);
                self.state.last_status_at = Some(now);
                self.recover();
            }
            Err(e) => self.mark_unreachable("is_moving", &e),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn issue(&mut self) -> Sequence {
        let sequence = self.sequencer.issue();
        self.state.last_sequence = Some(sequence);
        sequence
    }

    fn live_transport(&self) -> Option<Arc<dyn Transport>> {
        if lifecycle::has_session(self.state.phase) {
            self.transport.clone()
        } else {
            None
        }
    }

    fn is_current(&self, session: u64) -> bool {
        session == self.state.session && lifecycle::has_session(self.state.phase)
    }

    fn recover(&mut self) {
        self.state.connected = true;
        self.state.error_message = None;
        self.transition(ConnectionPhase::Connected);
    }

    fn mark_unreachable(&mut self, operation: &str, error: &TransportError) {
        if self.state.phase == ConnectionPhase::Error {
            tracing::debug!(operation, error = %error, "Robot still unreachable");
        } else {
            tracing::warn!(
                endpoint = %self.state.endpoint,
                operation,
                error = %error,
                "Robot unreachable"
            );
        }
        self.state.connected = false;
        self.state.loading = false;
        self.state.error_message = Some(unreachable_message(&self.state.endpoint, operation));
        self.transition(ConnectionPhase::Error);
    }

    fn transition(&mut self, to: ConnectionPhase) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        match lifecycle::validate_transition(from, to) {
            Ok(phase) => {
                tracing::debug!(
                    from = %from,
                    to = %phase,
                    session = self.state.session,
                    "Connection phase changed"
                );
                self.state.phase = phase;
            }
            Err(e) => tracing::warn!(
                error = %e,
                allowed = ?lifecycle::valid_transitions_from(from),
                "Ignoring connection transition"
            ),
        }
    }
}

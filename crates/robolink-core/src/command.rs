//! Movement intents, actuators, and the commands sent for them.
//!
//! Every command maps to one route on the robot server. Direction and
//! actuator commands are tagged with a [`Sequence`] so the robot can drop
//! stale deliveries; the stop command never is.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of travel. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Drive forward.
    Forward,
    /// Drive backward.
    Backward,
    /// Turn left.
    Left,
    /// Turn right.
    Right,
    /// Not moving.
    #[default]
    Stop,
}

impl Direction {
    /// Route segment for this direction, `None` for [`Direction::Stop`].
    #[must_use]
    pub const fn segment(self) -> Option<&'static str> {
        match self {
            Self::Forward => Some("forward"),
            Self::Backward => Some("backward"),
            Self::Left => Some("left"),
            Self::Right => Some("right"),
            Self::Stop => None,
        }
    }

    /// Returns true for every direction except [`Direction::Stop`].
    #[must_use]
    pub const fn is_moving(self) -> bool {
        !matches!(self, Self::Stop)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment().unwrap_or("stop"))
    }
}

/// A secondary on/off mechanism, independent of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actuator {
    /// Mechanical brake.
    Brake,
    /// Audible horn.
    Horn,
}

impl Actuator {
    /// Route segment for this actuator.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Brake => "brake",
            Self::Horn => "horn",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Sequence number attached to an actuation command.
///
/// Sequences are scoped to one connection session and start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(u64);

impl Sequence {
    /// The first sequence of every session.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw sequence value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The sequence that follows this one.
    #[must_use]
    pub const fn successor(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a command asks the robot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum CommandKind {
    /// Start moving in a direction.
    DirectionOn(Direction),
    /// Stop moving in a direction.
    DirectionOff(Direction),
    /// Engage an actuator.
    ActuatorOn(Actuator),
    /// Release an actuator.
    ActuatorOff(Actuator),
    /// Halt everything.
    Stop,
}

impl CommandKind {
    /// Route for this command, relative to the endpoint base URL.
    ///
    /// Direction commands for [`Direction::Stop`] have no route of their own
    /// and resolve to `stop`.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::DirectionOn(direction) => direction
                .segment()
                .map_or_else(|| "stop".to_string(), |s| format!("{s}/on")),
            Self::DirectionOff(direction) => direction
                .segment()
                .map_or_else(|| "stop".to_string(), |s| format!("{s}/off")),
            Self::ActuatorOn(actuator) => format!("{}/on", actuator.segment()),
            Self::ActuatorOff(actuator) => format!("{}/off", actuator.segment()),
            Self::Stop => "stop".to_string(),
        }
    }

    /// Returns true if this kind is tagged with a sequence number.
    #[must_use]
    pub const fn is_sequenced(self) -> bool {
        match self {
            Self::DirectionOn(direction) | Self::DirectionOff(direction) => direction.is_moving(),
            Self::ActuatorOn(_) | Self::ActuatorOff(_) => true,
            Self::Stop => false,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A command ready to be sent, with its optional sequence header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// What to do.
    pub kind: CommandKind,
    /// Sequence header value, absent for stop.
    pub sequence: Option<Sequence>,
}

impl Command {
    /// Start moving in `direction`.
    #[must_use]
    pub const fn direction_on(direction: Direction, sequence: Sequence) -> Self {
        Self {
            kind: CommandKind::DirectionOn(direction),
            sequence: Some(sequence),
        }
    }

    /// Stop moving in `direction`.
    #[must_use]
    pub const fn direction_off(direction: Direction, sequence: Sequence) -> Self {
        Self {
            kind: CommandKind::DirectionOff(direction),
            sequence: Some(sequence),
        }
    }

    /// Engage `actuator`.
    #[must_use]
    pub const fn actuator_on(actuator: Actuator, sequence: Sequence) -> Self {
        Self {
            kind: CommandKind::ActuatorOn(actuator),
            sequence: Some(sequence),
        }
    }

    /// Release `actuator`.
    #[must_use]
    pub const fn actuator_off(actuator: Actuator, sequence: Sequence) -> Self {
        Self {
            kind: CommandKind::ActuatorOff(actuator),
            sequence: Some(sequence),
        }
    }

    /// Halt everything. Never sequenced.
    #[must_use]
    pub const fn stop() -> Self {
        Self {
            kind: CommandKind::Stop,
            sequence: None,
        }
    }

    /// Route for this command, relative to the endpoint base URL.
    #[must_use]
    pub fn path(&self) -> String {
        self.kind.path()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sequence {
            Some(sequence) => write!(f, "{} (sequence {sequence})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

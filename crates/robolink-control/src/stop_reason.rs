//! Why the vehicle is currently stopped.
//!
//! The reason is an annotation on the control state. It never sends anything
//! to the robot. External sources (a perception pipeline, the operator) set
//! `RedLight` or `StopSign`; engaging the brake sets `ManualBrake`; any fresh
//! movement request clears it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Reason the vehicle is stopped, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    /// Not stopped for any recorded reason.
    #[default]
    None,
    /// Stopped at a red light.
    RedLight,
    /// Stopped at a stop sign.
    StopSign,
    /// Stopped because the operator engaged the brake.
    ManualBrake,
}

impl StopReason {
    /// Returns true unless the reason is `None`.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }

    pub(crate) const fn apply(self, update: StopReasonUpdate) -> Self {
        match update {
            StopReasonUpdate::Set(reason) => reason,
            StopReasonUpdate::Acknowledge | StopReasonUpdate::MovementRequested => Self::None,
            StopReasonUpdate::BrakeEngaged => Self::ManualBrake,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::RedLight => "RED_LIGHT",
            Self::StopSign => "STOP_SIGN",
            Self::ManualBrake => "MANUAL_BRAKE",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing an unknown stop reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stop reason: {0}")]
pub struct UnknownStopReason(String);

impl FromStr for StopReason {
    type Err = UnknownStopReason;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" => Ok(Self::None),
            "red-light" => Ok(Self::RedLight),
            "stop-sign" => Ok(Self::StopSign),
            "manual-brake" => Ok(Self::ManualBrake),
            _ => Err(UnknownStopReason(s.to_string())),
        }
    }
}

/// Something that changes the stop reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopReasonUpdate {
    Set(StopReason),
    Acknowledge,
    MovementRequested,
    BrakeEngaged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_clears_any_reason() {
        for reason in [StopReason::RedLight, StopReason::StopSign, StopReason::ManualBrake] {
            assert_eq!(reason.apply(StopReasonUpdate::MovementRequested), StopReason::None);
        }
    }

    #[test]
    fn brake_overrides_external_reason() {
        assert_eq!(
            StopReason::RedLight.apply(StopReasonUpdate::BrakeEngaged),
            StopReason::ManualBrake
        );
    }

    #[test]
    fn acknowledge_clears() {
        assert_eq!(
            StopReason::StopSign.apply(StopReasonUpdate::Acknowledge),
            StopReason::None
        );
        assert!(!StopReason::None.is_active());
    }

    #[test]
    fn parses_operator_spelling() {
        assert_eq!("red-light".parse::<StopReason>(), Ok(StopReason::RedLight));
        assert_eq!("STOP_SIGN".parse::<StopReason>(), Ok(StopReason::StopSign));
        assert_eq!("none".parse::<StopReason>(), Ok(StopReason::None));
        assert!("yield".parse::<StopReason>().is_err());
    }
}

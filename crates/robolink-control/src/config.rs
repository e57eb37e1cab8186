//! Control core configuration.

use std::time::Duration;

use serde::Deserialize;

/// Cadence and buffering for the control state machine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ControlConfig {
    /// Period between heartbeat pings, in milliseconds.
    #[serde(default = "ControlConfig::default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,

    /// Period between status polls, in milliseconds.
    #[serde(default = "ControlConfig::default_status_interval")]
    pub status_interval_ms: u64,

    /// Capacity of the state machine's event channel.
    #[serde(default = "ControlConfig::default_event_buffer")]
    pub event_buffer: usize,
}

impl ControlConfig {
    const fn default_heartbeat_interval() -> u64 {
        1000
    }

    const fn default_status_interval() -> u64 {
        500
    }

    const fn default_event_buffer() -> usize {
        64
    }

    /// Get the heartbeat period as a `Duration`, never shorter than
    /// [`MIN_INTERVAL`].
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        clamp_period(self.heartbeat_interval_ms)
    }

    /// Get the status poll period as a `Duration`, never shorter than
    /// [`MIN_INTERVAL`].
    #[must_use]
    pub const fn status_interval(&self) -> Duration {
        clamp_period(self.status_interval_ms)
    }
}

/// Shortest monitor period. `tokio::time::interval` rejects a zero period.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

const fn clamp_period(ms: u64) -> Duration {
    if ms == 0 {
        MIN_INTERVAL
    } else {
        Duration::from_millis(ms)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: Self::default_heartbeat_interval(),
            status_interval_ms: Self::default_status_interval(),
            event_buffer: Self::default_event_buffer(),
        }
    }
}

//! Where published snapshots go.

use crate::state::ControlState;

/// Receives every published [`ControlState`].
///
/// Called on the writer task after each change, so implementations must not
/// block.
pub trait PresentationSink: Send + Sync {
    /// Render or record `snapshot`.
    fn publish(&self, snapshot: &ControlState);
}

/// Discards snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn publish(&self, _snapshot: &ControlState) {}
}

/// Logs snapshots as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn publish(&self, snapshot: &ControlState) {
        tracing::info!(
            revision = snapshot.revision,
            phase = %snapshot.phase,
            endpoint = %snapshot.endpoint,
            direction = %snapshot.current_direction,
            brake = snapshot.actuators.brake,
            horn = snapshot.actuators.horn,
            stop_reason = %snapshot.stop_reason,
            sequence = ?snapshot.last_sequence.map(robolink_core::Sequence::get),
            error = snapshot.error_message.as_deref().unwrap_or(""),
            "Control state"
        );
    }
}

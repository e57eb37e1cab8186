//! Per-session sequence numbers for actuation commands.

use robolink_core::Sequence;

/// Issues strictly increasing sequence numbers, starting at 1.
///
/// Only direction and actuator commands are sequenced. Stop, heartbeat and
/// status requests are idempotent and never consume a number.
#[derive(Debug, Clone)]
pub struct CommandSequencer {
    next: Sequence,
}

impl CommandSequencer {
    /// Create a sequencer whose first number is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: Sequence::FIRST,
        }
    }

    /// Issue the next sequence number.
    pub fn issue(&mut self) -> Sequence {
        let issued = self.next;
        self.next = issued.successor();
        issued
    }

    /// The number the next call to [`issue`](Self::issue) will return.
    #[must_use]
    pub const fn peek(&self) -> Sequence {
        self.next
    }

    /// Start over at 1. Called whenever a new endpoint is connected.
    pub fn reset(&mut self) {
        self.next = Sequence::FIRST;
    }
}

impl Default for CommandSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one() {
        let mut sequencer = CommandSequencer::new();
        assert_eq!(sequencer.peek(), Sequence::FIRST);
        assert_eq!(sequencer.issue(), Sequence::new(1));
    }

    #[test]
    fn strictly_increasing() {
        let mut sequencer = CommandSequencer::new();
        let issued: Vec<u64> = (0..100).map(|_| sequencer.issue().get()).collect();
        assert!(issued.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(issued.last(), Some(&100));
    }

    #[test]
    fn reset_returns_to_one() {
        let mut sequencer = CommandSequencer::new();
        sequencer.issue();
        sequencer.issue();
        sequencer.reset();
        assert_eq!(sequencer.issue(), Sequence::FIRST);
        assert_eq!(sequencer.peek(), Sequence::new(2));
    }
}

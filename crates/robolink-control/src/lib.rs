//! Control core for robolink teleoperation.
//!
//! This crate turns operator intents into sequenced robot commands, keeps
//! the link alive with a heartbeat, polls robot status, and exposes one
//! authoritative [`ControlState`].
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐   ┌───────────────────┐   ┌───────────────────┐
//! │ CommandDispatcher │   │ HeartbeatMonitor  │   │   StatusPoller    │
//! └─────────┬─────────┘   └─────────┬─────────┘   └─────────┬─────────┘
//!           │ prepare/complete      │ tick                  │ tick
//!           ▼                       ▼                       ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                writer task (ControlStateMachine)                    │
//! │   ControlState · CommandSequencer · lifecycle · stop reason         │
//! └─────────────────────────────────┬───────────────────────────────────┘
//!                                   │ snapshots
//!                       ┌───────────┴───────────┐
//!                       ▼                       ▼
//!               PresentationSink        watch::Receiver
//! ```
//!
//! The Transport round trip for a command runs on the caller's task, so
//! commands and monitor ticks overlap on the network while every state
//! mutation stays serialized in the writer.
//!
//! # State Machine
//!
//! - `Disconnected` → `Connecting` on connect
//! - `Connecting` → `Connected` once the transport is built, or `Error`
//! - `Connected` → `Error` on any failed call
//! - `Error` → `Connected` on the next successful call
//! - any session phase → `Disconnected` on disconnect

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
mod machine;
mod monitor;
pub mod presentation;
pub mod sequencer;
pub mod state;
pub mod stop_reason;
mod writer;

pub use config::ControlConfig;
pub use dispatcher::{CommandDispatcher, DispatchOutcome};
pub use error::{ControlError, Result};
pub use lifecycle::ConnectionPhase;
pub use presentation::{NullSink, PresentationSink, TracingSink};
pub use sequencer::CommandSequencer;
pub use state::{ActuatorStates, ControlState, NOT_CONNECTED_MESSAGE};
pub use stop_reason::{StopReason, UnknownStopReason};
pub use writer::{ControlHandle, ControlStateMachine};

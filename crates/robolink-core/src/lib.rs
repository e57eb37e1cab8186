//! Core value types for robolink.
//!
//! This crate provides the vocabulary shared by the transport and control
//! crates:
//!
//! - **Endpoint**: the host/port of the remote robot server
//! - **Commands**: directions, actuators, sequence numbers and the wire paths
//!   they map to
//! - **Payloads**: command responses and status snapshots returned by the robot
//!
//! # Example
//!
//! ```
//! use robolink_core::{Actuator, Command, Endpoint, Sequence};
//!
//! let endpoint = Endpoint::new("10.0.0.5", 6000).unwrap();
//! assert_eq!(endpoint.base_url(), "http://10.0.0.5:6000/");
//!
//! let horn = Command::actuator_on(Actuator::Horn, Sequence::new(1));
//! assert_eq!(horn.path(), "horn/on");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod endpoint;
pub mod error;
pub mod status;

pub use command::{Actuator, Command, CommandKind, Direction, Sequence};
pub use endpoint::Endpoint;
pub use error::{CoreError, Result};
pub use status::{ControlResponse, StatusSnapshot};

//! In-process robot used by the control integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use robolink_control::{ControlConfig, ControlHandle, ControlState, ControlStateMachine, PresentationSink};
use robolink_core::{Command, ControlResponse, Endpoint, StatusSnapshot};
use robolink_transport::{Result, Transport, TransportError, TransportFactory};
use tokio::sync::Notify;

/// A call the robot received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Command(Command),
    Heartbeat,
    Status,
}

/// Records every call and fails all of them while `failing` is set.
///
/// A command can be held in flight with [`MockRobot::hold_next_command`]: it
/// is recorded as received but its response waits until the gate opens.
#[derive(Debug)]
pub struct MockRobot {
    endpoint: Endpoint,
    calls: Mutex<Vec<Call>>,
    failing: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockRobot {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            gate: Mutex::new(None),
        }
    }

    /// Hold the response to the next command until `notify_one` is called on
    /// the returned gate.
    pub fn hold_next_command(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Command(command) => Some(*command),
                _ => None,
            })
            .collect()
    }

    pub fn heartbeats(&self) -> usize {
        self.count(&Call::Heartbeat)
    }

    pub fn status_polls(&self) -> usize {
        self.count(&Call::Status)
    }

    fn count(&self, wanted: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == wanted).count()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().push(call);
        if self.failing.load(Ordering::SeqCst) {
            Err(TransportError::Connection("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for MockRobot {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn send_command(&self, command: &Command) -> Result<ControlResponse> {
        let gate = self.gate.lock().take();
        let recorded = self.record(Call::Command(*command));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        recorded?;
        Ok(ControlResponse {
            status: format!("{} ok", command.kind),
            action: None,
            timestamp: None,
        })
    }

    async fn heartbeat(&self) -> Result<()> {
        self.record(Call::Heartbeat)
    }

    async fn status(&self) -> Result<StatusSnapshot> {
        self.record(Call::Status)?;
        Ok(StatusSnapshot {
            connected: true,
            moving: Some(false),
            ..StatusSnapshot::default()
        })
    }
}

/// Builds one `MockRobot` per connect and keeps them for inspection.
#[derive(Debug, Default)]
pub struct MockFactory {
    robots: Mutex<Vec<Arc<MockRobot>>>,
    refuse: AtomicBool,
}

impl MockFactory {
    pub fn set_refusing(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// The robot built for the `index`th successful connect.
    pub fn robot(&self, index: usize) -> Arc<MockRobot> {
        Arc::clone(&self.robots.lock()[index])
    }

    pub fn built(&self) -> usize {
        self.robots.lock().len()
    }
}

impl TransportFactory for MockFactory {
    fn create(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::InvalidEndpoint(endpoint.to_string()));
        }
        let robot = Arc::new(MockRobot::new(endpoint.clone()));
        self.robots.lock().push(Arc::clone(&robot));
        Ok(robot)
    }
}

/// Remembers every published snapshot.
#[derive(Debug, Default)]
pub struct RecordingSink {
    snapshots: Mutex<Vec<ControlState>>,
}

impl RecordingSink {
    pub fn snapshots(&self) -> Vec<ControlState> {
        self.snapshots.lock().clone()
    }
}

impl PresentationSink for RecordingSink {
    fn publish(&self, snapshot: &ControlState) {
        self.snapshots.lock().push(snapshot.clone());
    }
}

pub fn endpoint(host: &str) -> Endpoint {
    Endpoint::new(host, 5000).unwrap()
}

pub fn spawn(factory: &Arc<MockFactory>) -> ControlHandle {
    spawn_with(factory, ControlConfig::default())
}

pub fn spawn_with(factory: &Arc<MockFactory>, config: ControlConfig) -> ControlHandle {
    ControlStateMachine::new(Arc::clone(factory) as Arc<dyn TransportFactory>)
        .with_config(config)
        .spawn()
}

/// Yield until the robot has received `count` commands.
pub async fn wait_for_commands(robot: &MockRobot, count: usize) {
    while robot.commands().len() < count {
        tokio::task::yield_now().await;
    }
}

/// Let the writer drain its queue without advancing paused time by a tick.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

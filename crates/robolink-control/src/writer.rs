//! The writer task and its handle.
//!
//! One task owns the [`Machine`]. Everything that changes state arrives as an
//! [`Event`] on a bounded channel and is handled to completion before the
//! next one, so snapshots are published in a single order.

use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use robolink_core::{Command, ControlResponse, Endpoint, StatusSnapshot};
use robolink_transport::{Transport, TransportFactory};
use tokio::sync::{mpsc, oneshot, watch};

use crate::config::ControlConfig;
use crate::dispatcher::{CommandDispatcher, DispatchOutcome};
use crate::error::{ControlError, Result};
use crate::machine::{Intent, Machine, Pending, Prepared};
use crate::monitor::{HeartbeatMonitor, StatusPoller};
use crate::presentation::{NullSink, PresentationSink};
use crate::state::ControlState;
use crate::stop_reason::{StopReason, StopReasonUpdate};

type Reply<T> = oneshot::Sender<T>;

/// A message to the writer task.
pub(crate) enum Event {
    Connect {
        endpoint: Endpoint,
        reply: Reply<Option<Arc<dyn Transport>>>,
    },
    Disconnect {
        reply: Reply<Option<Arc<dyn Transport>>>,
    },
    Shutdown {
        reply: Reply<Option<Arc<dyn Transport>>>,
    },
    Prepare {
        intent: Intent,
        reply: Reply<Option<Prepared>>,
    },
    Complete {
        pending: Pending,
        result: robolink_transport::Result<ControlResponse>,
        reply: Reply<DispatchOutcome>,
    },
    Heartbeat {
        session: u64,
        result: robolink_transport::Result<()>,
    },
    Status {
        session: u64,
        result: robolink_transport::Result<StatusSnapshot>,
        at: DateTime<Utc>,
    },
    StopReason {
        update: StopReasonUpdate,
        reply: Reply<()>,
    },
    ClearError {
        reply: Reply<()>,
    },
}

/// Builder for the control state machine.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use robolink_control::{ControlStateMachine, TracingSink};
/// use robolink_core::{Direction, Endpoint};
/// use robolink_transport::HttpTransportFactory;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = ControlStateMachine::new(Arc::new(HttpTransportFactory::default()))
///     .with_sink(Arc::new(TracingSink))
///     .spawn();
///
/// handle.connect(Endpoint::new("192.168.1.103", 5000)?).await?;
/// handle.dispatcher().press_direction(Direction::Forward).await;
/// handle.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct ControlStateMachine {
    factory: Arc<dyn TransportFactory>,
    config: ControlConfig,
    endpoint: Endpoint,
    sink: Arc<dyn PresentationSink>,
}

impl ControlStateMachine {
    /// Create a machine that builds transports with `factory`.
    #[must_use]
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            factory,
            config: ControlConfig::default(),
            endpoint: Endpoint::default(),
            sink: Arc::new(NullSink),
        }
    }

    /// Use cadence and buffering from `config`.
    #[must_use]
    pub fn with_config(mut self, config: ControlConfig) -> Self {
        self.config = config;
        self
    }

    /// Endpoint shown in the initial state, before any connect.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Publish every snapshot to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Spawn the writer task on the current tokio runtime.
    ///
    /// The machine starts DISCONNECTED. It runs until [`ControlHandle::shutdown`]
    /// is called or every handle is dropped.
    #[must_use]
    pub fn spawn(self) -> ControlHandle {
        let (events_tx, events_rx) = mpsc::channel(self.config.event_buffer.max(1));
        let machine = Machine::new(self.endpoint);
        let (snapshots_tx, snapshots_rx) = watch::channel(machine.state().clone());
        self.sink.publish(machine.state());

        let writer = Writer {
            machine,
            factory: self.factory,
            config: self.config,
            sink: self.sink,
            snapshots: snapshots_tx,
            events: events_tx.downgrade(),
            heartbeat: None,
            status: None,
        };
        tokio::spawn(writer.run(events_rx));

        ControlHandle {
            events: events_tx,
            snapshots: snapshots_rx,
        }
    }
}

struct Writer {
    machine: Machine,
    factory: Arc<dyn TransportFactory>,
    config: ControlConfig,
    sink: Arc<dyn PresentationSink>,
    snapshots: watch::Sender<ControlState>,
    events: mpsc::WeakSender<Event>,
    heartbeat: Option<HeartbeatMonitor>,
    status: Option<StatusPoller>,
}

impl Writer {
    async fn run(mut self, mut events: mpsc::Receiver<Event>) {
        tracing::debug!("Control writer started");
        while let Some(event) = events.recv().await {
            if self.handle(event).is_break() {
                break;
            }
        }
        self.stop_monitors();
        tracing::debug!("Control writer stopped");
    }

    fn handle(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::Connect { endpoint, reply } => {
                self.stop_monitors();
                let previous = self.mutate(|m| m.begin_connect(endpoint));
                let factory = Arc::clone(&self.factory);
                let started = self.mutate(|m| {
                    let result = factory.create(&m.state().endpoint);
                    m.finish_connect(result)
                });
                if let Some(transport) = started {
                    self.start_monitors(&transport);
                }
                let _ = reply.send(previous);
            }
            Event::Disconnect { reply } => {
                self.stop_monitors();
                let _ = reply.send(self.mutate(Machine::end_session));
            }
            Event::Shutdown { reply } => {
                self.stop_monitors();
                let _ = reply.send(self.mutate(Machine::end_session));
                return ControlFlow::Break(());
            }
            Event::Prepare { intent, reply } => {
                let _ = reply.send(self.mutate(|m| m.prepare(intent)));
            }
            Event::Complete {
                pending,
                result,
                reply,
            } => {
                let _ = reply.send(self.mutate(|m| m.complete(&pending, result)));
            }
            Event::Heartbeat { session, result } => {
                self.mutate(|m| m.observe_heartbeat(session, result));
            }
            Event::Status {
                session,
                result,
                at,
            } => {
                self.mutate(|m| m.observe_status(session, result, at));
            }
            Event::StopReason { update, reply } => {
                self.mutate(|m| m.update_stop_reason(update));
                let _ = reply.send(());
            }
            Event::ClearError { reply } => {
                self.mutate(Machine::clear_error);
                let _ = reply.send(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Run `f` against the machine and publish if the state changed.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut Machine) -> T) -> T {
        let before = self.machine.state().clone();
        let output = f(&mut self.machine);
        if !self.machine.state().same_content(&before) {
            let snapshot = self.machine.next_revision().clone();
            self.sink.publish(&snapshot);
            self.snapshots.send_replace(snapshot);
        }
        output
    }

    fn start_monitors(&mut self, transport: &Arc<dyn Transport>) {
        let session = self.machine.state().session;
        self.heartbeat = Some(HeartbeatMonitor::start(
            Arc::clone(transport),
            session,
            self.config.heartbeat_interval(),
            self.events.clone(),
        ));
        self.status = Some(StatusPoller::start(
            Arc::clone(transport),
            session,
            self.config.status_interval(),
            self.events.clone(),
        ));
    }

    fn stop_monitors(&mut self) {
        self.heartbeat = None;
        self.status = None;
    }
}

/// Cloneable handle to a running control state machine.
#[derive(Clone)]
pub struct ControlHandle {
    events: mpsc::Sender<Event>,
    snapshots: watch::Receiver<ControlState>,
}

impl ControlHandle {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connect to `endpoint`, tearing down any current session first.
    ///
    /// A failed connect is not an error here: the state moves to ERROR with a
    /// diagnostic. The previous robot, if any, is sent a best-effort stop.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::MachineStopped` if the writer has shut down.
    pub async fn connect(&self, endpoint: Endpoint) -> Result<()> {
        let previous = self
            .request(|reply| Event::Connect { endpoint, reply })
            .await?;
        if let Some(transport) = previous {
            send_best_effort_stop(transport).await;
        }
        Ok(())
    }

    /// Cancel the monitors, stop the robot and release the session.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::MachineStopped` if the writer has shut down.
    pub async fn disconnect(&self) -> Result<()> {
        let previous = self.request(|reply| Event::Disconnect { reply }).await?;
        if let Some(transport) = previous {
            send_best_effort_stop(transport).await;
        }
        Ok(())
    }

    /// Disconnect and stop the writer task.
    ///
    /// Other clones of this handle observe `MachineStopped` afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::MachineStopped` if the writer had already shut
    /// down.
    pub async fn shutdown(self) -> Result<()> {
        let previous = self.request(|reply| Event::Shutdown { reply }).await?;
        if let Some(transport) = previous {
            send_best_effort_stop(transport).await;
        }
        tracing::info!("Control state machine shut down");
        Ok(())
    }

    /// Dismiss the error message without touching the connection phase.
    ///
    /// The next failed call reports a fresh diagnostic.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::MachineStopped` if the writer has shut down.
    pub async fn clear_error(&self) -> Result<()> {
        self.request(|reply| Event::ClearError { reply }).await
    }

    // =========================================================================
    // Stop Reason
    // =========================================================================

    /// Record why the vehicle is stopped. Nothing is sent to the robot.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::MachineStopped` if the writer has shut down.
    pub async fn set_stop_reason(&self, reason: StopReason) -> Result<()> {
        self.update_stop_reason(StopReasonUpdate::Set(reason)).await
    }

    /// Clear the stop reason.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::MachineStopped` if the writer has shut down.
    pub async fn acknowledge_stop_reason(&self) -> Result<()> {
        self.update_stop_reason(StopReasonUpdate::Acknowledge).await
    }

    async fn update_stop_reason(&self, update: StopReasonUpdate) -> Result<()> {
        self.request(|reply| Event::StopReason { update, reply })
            .await
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ControlState {
        self.snapshots.borrow().clone()
    }

    /// A receiver that yields each newly published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControlState> {
        self.snapshots.clone()
    }

    /// Returns true while the writer task accepts events.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.events.is_closed()
    }

    /// A dispatcher issuing commands through this machine.
    #[must_use]
    pub fn dispatcher(&self) -> CommandDispatcher {
        CommandDispatcher::new(self.clone())
    }

    // =========================================================================
    // Command plumbing
    // =========================================================================

    pub(crate) async fn prepare(&self, intent: Intent) -> Result<Option<Prepared>> {
        self.request(|reply| Event::Prepare { intent, reply }).await
    }

    pub(crate) async fn complete(
        &self,
        pending: Pending,
        result: robolink_transport::Result<ControlResponse>,
    ) -> Result<DispatchOutcome> {
        self.request(|reply| Event::Complete {
            pending,
            result,
            reply,
        })
        .await
    }

    async fn request<T>(&self, event: impl FnOnce(Reply<T>) -> Event) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(event(reply))
            .await
            .map_err(|_| ControlError::MachineStopped)?;
        response.await.map_err(|_| ControlError::MachineStopped)
    }
}

async fn send_best_effort_stop(transport: Arc<dyn Transport>) {
    match transport.send_command(&Command::stop()).await {
        Ok(_) => tracing::debug!(endpoint = %transport.endpoint(), "Stopped released robot"),
        Err(e) => tracing::warn!(
            endpoint = %transport.endpoint(),
            error = %e,
            "Best-effort stop failed"
        ),
    }
}

//! Periodic liveness tasks.
//!
//! Each monitor is a spawned loop on a fixed `tokio::time::interval` that
//! reports its result to the writer as an [`Event`]. Monitors hold only a weak
//! sender: once every `ControlHandle` is gone the upgrade fails and the loop
//! exits. Dropping a monitor aborts its task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use robolink_transport::Transport;
use tokio::sync::mpsc::WeakSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::MIN_INTERVAL;
use crate::writer::Event;

/// Aborts the wrapped task when dropped.
#[derive(Debug)]
struct MonitorTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl MonitorTask {
    fn spawn<F, Fut>(
        name: &'static str,
        period: Duration,
        events: WeakSender<Event>,
        mut probe: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Event> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period.max(MIN_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let event = probe().await;
                let Some(sender) = events.upgrade() else {
                    break;
                };
                if sender.send(event).await.is_err() {
                    break;
                }
            }
            tracing::debug!(monitor = name, "Monitor exited");
        });

        Self { name, handle }
    }
}

impl Drop for MonitorTask {
    fn drop(&mut self) {
        tracing::debug!(monitor = self.name, "Cancelling monitor");
        self.handle.abort();
    }
}

/// Sends `POST /heartbeat` once per period.
#[derive(Debug)]
pub(crate) struct HeartbeatMonitor {
    _task: MonitorTask,
}

impl HeartbeatMonitor {
    pub(crate) fn start(
        transport: Arc<dyn Transport>,
        session: u64,
        period: Duration,
        events: WeakSender<Event>,
    ) -> Self {
        let task = MonitorTask::spawn("heartbeat", period, events, move || {
            let transport = Arc::clone(&transport);
            async move {
                let result = transport.heartbeat().await;
                tracing::debug!(ok = result.is_ok(), "Heartbeat tick");
                Event::Heartbeat { session, result }
            }
        });
        Self { _task: task }
    }
}

/// Polls `GET /is_moving` once per period.
#[derive(Debug)]
pub(crate) struct StatusPoller {
    _task: MonitorTask,
}

impl StatusPoller {
    pub(crate) fn start(
        transport: Arc<dyn Transport>,
        session: u64,
        period: Duration,
        events: WeakSender<Event>,
    ) -> Self {
        let task = MonitorTask::spawn("status", period, events, move || {
            let transport = Arc::clone(&transport);
            async move {
                let result = transport.status().await;
                tracing::debug!(ok = result.is_ok(), "Status tick");
                Event::Status {
                    session,
                    result,
                    at: Utc::now(),
                }
            }
        });
        Self { _task: task }
    }
}

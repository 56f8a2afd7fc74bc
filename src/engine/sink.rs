// src/engine/sink.rs

//! Outward notification interface.
//!
//! Notifications arrive from many Tokio tasks at once, on whatever worker
//! thread happens to run them. Implementations must therefore be thread-safe;
//! the simplest option is [`ChannelSink`], which funnels everything into one
//! unbounded channel with a single consumer.
//!
//! Sinks must not call back into the orchestrator: some notifications are
//! delivered while the registry lock is held.

use tokio::sync::mpsc;
use tracing::trace;

use crate::engine::{OrchestratorEvent, TaskUpdate};

/// Receiver of task and aggregate state notifications.
pub trait EventSink: Send + Sync {
    /// A task changed state (or reported progress while running).
    fn on_task_state_changed(&self, update: TaskUpdate);

    /// The number of active (queued or running) tasks changed.
    fn on_aggregate_state_changed(&self, active_count: usize);
}

/// Sink that forwards every notification over an unbounded mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OrchestratorEvent>,
}

impl ChannelSink {
    /// Create a sink together with the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OrchestratorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: OrchestratorEvent) {
        if self.tx.send(event).is_err() {
            trace!("event receiver dropped; discarding notification");
        }
    }
}

impl EventSink for ChannelSink {
    fn on_task_state_changed(&self, update: TaskUpdate) {
        self.send(OrchestratorEvent::TaskStateChanged(update));
    }

    fn on_aggregate_state_changed(&self, active_count: usize) {
        self.send(OrchestratorEvent::AggregateStateChanged { active_count });
    }
}

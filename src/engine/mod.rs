// src/engine/mod.rs

//! Download task orchestration.
//!
//! This module ties together:
//! - the per-task state machine ([`task`])
//! - the orchestrator that owns the registry of active tasks and the bulk
//!   dispatch / cancel operations ([`orchestrator`])
//! - the outward notification interface ([`sink`])
//!
//! The async reader loop that drives a task lives in
//! `exec::task_runner`.

use crate::types::TaskState;

/// Canonical identifier type for a downloadable item (URL or id).
pub type Identifier = String;

/// Notification payload emitted on every task state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskUpdate {
    pub identifier: Identifier,
    pub state: TaskState,
    /// Fraction in `[0.0, 1.0]`.
    pub progress: f64,
    pub message: String,
}

/// Events carried by [`ChannelSink`] to a single consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorEvent {
    TaskStateChanged(TaskUpdate),
    AggregateStateChanged { active_count: usize },
}

pub mod orchestrator;
pub mod sink;
pub mod task;

pub use orchestrator::{DispatchOutcome, Orchestrator, OrchestratorSettings};
pub use sink::{ChannelSink, EventSink};
pub use task::Task;

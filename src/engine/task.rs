// src/engine/task.rs

//! Pure per-task state machine.
//!
//! A [`Task`] performs no IO. Its runner feeds it lifecycle signals and output
//! lines; every accepted transition returns exactly one [`TaskUpdate`] for the
//! event sink, and a rejected one returns `None`. Terminal states are
//! absorbing.
//!
//! ```text
//! Queued ──spawn ok──▶ Running ──stream end──▶ Completed | Failed
//!   │                    │ ▲
//!   │ spawn error        │ └── percent / status line
//!   ▼                    ▼
//! Failed            Cancelled ◀── cancel (Queued or Running)
//! ```

use crate::engine::{Identifier, TaskUpdate};
use crate::errors::SpawnError;
use crate::parse::{ProgressEvent, Verdict, parse_progress_line};
use crate::types::TaskState;

#[derive(Debug, Clone)]
pub struct Task {
    identifier: Identifier,
    state: TaskState,
    progress: f64,
    last_message: String,
    output: Vec<String>,
}

impl Task {
    pub fn new(identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            state: TaskState::Queued,
            progress: 0.0,
            last_message: "Queued".to_string(),
            output: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Every output line seen so far; emptied once the task is terminal.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn snapshot(&self) -> TaskUpdate {
        TaskUpdate {
            identifier: self.identifier.clone(),
            state: self.state,
            progress: self.progress,
            message: self.last_message.clone(),
        }
    }

    /// `Queued → Running` after the process was spawned.
    pub fn start(&mut self) -> Option<TaskUpdate> {
        if self.state != TaskState::Queued {
            return None;
        }
        self.state = TaskState::Running;
        self.last_message = "Starting...".to_string();
        Some(self.snapshot())
    }

    /// `Queued → Failed` when the process could not be spawned.
    pub fn fail_to_spawn(&mut self, err: &SpawnError) -> Option<TaskUpdate> {
        if self.state != TaskState::Queued {
            return None;
        }
        self.transition_terminal(TaskState::Failed, format!("Spawn error: {err}"))
    }

    /// Record one output line while running.
    ///
    /// The line is always retained for outcome classification. Percent and
    /// status lines produce an update; blank lines do not.
    pub fn record_line(&mut self, line: &str) -> Option<TaskUpdate> {
        if self.state != TaskState::Running {
            return None;
        }
        self.output.push(line.to_string());

        match parse_progress_line(line) {
            ProgressEvent::PercentUpdate(fraction) => {
                // yt-dlp restarts at 0% for every stream it fetches.
                self.progress = self.progress.max(fraction);
                self.last_message = format!("Downloading: {:.1}%", fraction * 100.0);
                Some(self.snapshot())
            }
            ProgressEvent::StatusMessage(text) => {
                self.last_message = text;
                Some(self.snapshot())
            }
            ProgressEvent::Unrecognized => None,
        }
    }

    /// `Running → Completed | Failed` according to the outcome verdict.
    pub fn finish(&mut self, verdict: Verdict) -> Option<TaskUpdate> {
        if self.state != TaskState::Running {
            return None;
        }
        match verdict {
            Verdict::Success => {
                self.progress = 1.0;
                self.transition_terminal(TaskState::Completed, "Download complete".to_string())
            }
            Verdict::Failure(reason) => self.transition_terminal(TaskState::Failed, reason),
        }
    }

    /// `Queued | Running → Cancelled`.
    pub fn cancel(&mut self) -> Option<TaskUpdate> {
        if self.state.is_terminal() {
            return None;
        }
        self.transition_terminal(TaskState::Cancelled, "Cancelled".to_string())
    }

    fn transition_terminal(&mut self, state: TaskState, message: String) -> Option<TaskUpdate> {
        self.state = state;
        self.last_message = message;
        self.output = Vec::new();
        Some(self.snapshot())
    }
}

// src/session/core.rs

//! Pure core of a download session.
//!
//! Consumes [`OrchestratorEvent`]s and produces report lines plus the
//! decision whether every requested item has reached a terminal state. It has
//! no channels, no Tokio types and performs no IO, so it can be unit tested
//! directly.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::engine::{Identifier, OrchestratorEvent, TaskUpdate};
use crate::playlist::PlaylistItem;
use crate::types::TaskState;

/// Final tally of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub completed: usize,
    pub cancelled: usize,
    /// `(title, reason)` for every failed item.
    pub failed: Vec<(String, String)>,
}

impl SessionSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.cancelled == 0
    }
}

/// What the shell should do after one event.
#[derive(Debug, Clone, Default)]
pub struct SessionStep {
    /// Lines to print, in order.
    pub lines: Vec<String>,
    /// Every requested item is terminal.
    pub finished: bool,
}

#[derive(Debug)]
struct ItemView {
    title: String,
    state: Option<TaskState>,
    /// Last reported tenth of progress, used to throttle percent lines.
    decile: u8,
}

#[derive(Debug)]
pub struct SessionCore {
    items: HashMap<Identifier, ItemView>,
    pending: HashSet<Identifier>,
    summary: SessionSummary,
}

impl SessionCore {
    /// Track the given items until each of them is terminal.
    pub fn new(items: &[PlaylistItem]) -> Self {
        let mut views = HashMap::new();
        let mut pending = HashSet::new();
        for item in items {
            pending.insert(item.identifier.clone());
            views.insert(
                item.identifier.clone(),
                ItemView {
                    title: item.title.clone(),
                    state: None,
                    decile: 0,
                },
            );
        }

        Self {
            items: views,
            pending,
            summary: SessionSummary::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    pub fn into_summary(self) -> SessionSummary {
        self.summary
    }

    pub fn apply(&mut self, event: OrchestratorEvent) -> SessionStep {
        let mut lines = Vec::new();

        match event {
            OrchestratorEvent::TaskStateChanged(update) => {
                if let Some(line) = self.apply_update(update) {
                    lines.push(line);
                }
            }
            OrchestratorEvent::AggregateStateChanged { active_count } => {
                debug!(active_count, pending = self.pending.len(), "aggregate state changed");
            }
        }

        SessionStep {
            lines,
            finished: self.is_finished(),
        }
    }

    fn apply_update(&mut self, update: TaskUpdate) -> Option<String> {
        let Some(view) = self.items.get_mut(&update.identifier) else {
            debug!(identifier = %update.identifier, "update for untracked item; ignoring");
            return None;
        };

        let state_changed = view.state != Some(update.state);
        view.state = Some(update.state);

        match update.state {
            TaskState::Queued => {
                view.decile = 0;
                Some(format!("[{}] queued", view.title))
            }
            TaskState::Running if state_changed => Some(format!("[{}] starting", view.title)),
            TaskState::Running => {
                let decile = (update.progress * 10.0).floor().clamp(0.0, 10.0) as u8;
                if decile > view.decile {
                    view.decile = decile;
                    Some(format!("[{}] {:>3}%", view.title, u32::from(decile) * 10))
                } else {
                    debug!(title = %view.title, message = %update.message, "progress");
                    None
                }
            }
            TaskState::Completed => {
                self.pending.remove(&update.identifier);
                self.summary.completed += 1;
                Some(format!("[{}] download complete", view.title))
            }
            TaskState::Failed => {
                self.pending.remove(&update.identifier);
                let reason = update.message.lines().last().unwrap_or_default().to_string();
                self.summary
                    .failed
                    .push((view.title.clone(), update.message.clone()));
                Some(format!("[{}] download failed: {}", view.title, reason))
            }
            TaskState::Cancelled => {
                self.pending.remove(&update.identifier);
                self.summary.cancelled += 1;
                Some(format!("[{}] cancelled", view.title))
            }
        }
    }
}

// src/engine/orchestrator.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::engine::sink::EventSink;
use crate::engine::task::Task;
use crate::engine::{Identifier, TaskUpdate};
use crate::exec::ProcessBackend;
use crate::exec::task_runner::{TaskRun, run_task};
use crate::types::DownloadOptions;

/// Orchestrator-wide settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrchestratorSettings {
    /// Force-kill a cancelled process whose output has not ended this long
    /// after the termination signal. `None` waits indefinitely.
    pub cancel_grace: Option<Duration>,
}

/// Result of a [`Orchestrator::dispatch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A new task was registered and its runner spawned.
    Started { task_id: u64 },
    /// A task for this identifier is already queued or running.
    AlreadyActive,
}

/// Registry slot for a queued or running task.
///
/// `cancel` is taken on the first cancellation request, which makes repeated
/// requests no-ops.
struct ActiveTask {
    task_id: u64,
    cancel: Option<oneshot::Sender<()>>,
}

/// Owns the registry of active download tasks and the bulk operations on it.
///
/// Cloning is cheap and every clone refers to the same registry. All methods
/// are non-blocking; `dispatch` must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Shared>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("active_count", &self.active_count())
            .field("settings", &self.shared.settings)
            .finish_non_exhaustive()
    }
}

/// State shared between the orchestrator handles and every task runner.
pub(crate) struct Shared {
    backend: Arc<dyn ProcessBackend>,
    sink: Arc<dyn EventSink>,
    registry: Mutex<HashMap<Identifier, ActiveTask>>,
    next_task_id: AtomicU64,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn ProcessBackend>,
        sink: Arc<dyn EventSink>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                sink,
                registry: Mutex::new(HashMap::new()),
                next_task_id: AtomicU64::new(1),
                settings,
            }),
        }
    }

    /// Register a task for `identifier` and start it in the background.
    ///
    /// Returns [`DispatchOutcome::AlreadyActive`] without side effects when
    /// the identifier already has a queued or running task.
    pub fn dispatch(
        &self,
        identifier: impl Into<Identifier>,
        options: &DownloadOptions,
    ) -> DispatchOutcome {
        let identifier = identifier.into();
        let task = Task::new(identifier.clone());
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        let task_id = {
            let mut registry = self.shared.lock_registry();
            if registry.contains_key(&identifier) {
                debug!(identifier = %identifier, "task already active; ignoring dispatch");
                return DispatchOutcome::AlreadyActive;
            }

            let task_id = self.shared.next_task_id.fetch_add(1, Ordering::Relaxed);
            registry.insert(
                identifier.clone(),
                ActiveTask {
                    task_id,
                    cancel: Some(cancel_tx),
                },
            );

            // Under the lock, so the Queued notification cannot overtake the
            // terminal notification of a previous task for this identifier.
            self.shared.sink.on_task_state_changed(task.snapshot());
            self.shared.sink.on_aggregate_state_changed(registry.len());
            task_id
        };

        info!(identifier = %identifier, task_id, "dispatching download task");

        let args = options.command_args(&identifier);
        tokio::spawn(run_task(TaskRun {
            shared: Arc::clone(&self.shared),
            task_id,
            task,
            args,
            cancel_rx,
        }));

        DispatchOutcome::Started { task_id }
    }

    /// Dispatch every identifier that is not already active.
    ///
    /// Returns the number of tasks started. A spawn failure for one item only
    /// fails that item's task.
    pub fn dispatch_all<I, S>(&self, identifiers: I, options: &DownloadOptions) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        identifiers
            .into_iter()
            .map(|id| self.dispatch(id, options))
            .filter(|outcome| matches!(outcome, DispatchOutcome::Started { .. }))
            .count()
    }

    /// Request cancellation of the task for `identifier`.
    ///
    /// Returns `true` if a cancellation signal was issued. Unknown, finished
    /// and already-cancelled tasks are left alone.
    pub fn cancel(&self, identifier: &str) -> bool {
        let mut registry = self.shared.lock_registry();
        let Some(entry) = registry.get_mut(identifier) else {
            debug!(identifier, "cancel requested for inactive task; ignoring");
            return false;
        };
        signal_cancel(identifier, entry)
    }

    /// Request cancellation of every active task. Returns how many were
    /// signalled.
    pub fn cancel_all(&self) -> usize {
        let mut registry = self.shared.lock_registry();
        let mut signalled = 0;
        for (identifier, entry) in registry.iter_mut() {
            if signal_cancel(identifier, entry) {
                signalled += 1;
            }
        }

        info!(signalled, active = registry.len(), "cancel-all requested");
        signalled
    }

    /// Number of queued or running tasks right now.
    pub fn active_count(&self) -> usize {
        self.shared.lock_registry().len()
    }

    pub fn is_idle(&self) -> bool {
        self.active_count() == 0
    }

    pub fn is_active(&self, identifier: &str) -> bool {
        self.shared.lock_registry().contains_key(identifier)
    }

    /// Identifiers of all active tasks, sorted.
    pub fn active_identifiers(&self) -> Vec<Identifier> {
        let mut ids: Vec<Identifier> = self.shared.lock_registry().keys().cloned().collect();
        ids.sort();
        ids
    }
}

fn signal_cancel(identifier: &str, entry: &mut ActiveTask) -> bool {
    let Some(cancel) = entry.cancel.take() else {
        debug!(identifier, task_id = entry.task_id, "cancellation already requested");
        return false;
    };

    if cancel.send(()).is_err() {
        debug!(
            identifier,
            task_id = entry.task_id,
            "task runner already finished while cancelling"
        );
        return false;
    }

    info!(identifier, task_id = entry.task_id, "cancellation requested");
    true
}

impl Shared {
    /// A panicking sink must not wedge the registry for everyone else.
    fn lock_registry(&self) -> MutexGuard<'_, HashMap<Identifier, ActiveTask>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn backend(&self) -> &dyn ProcessBackend {
        self.backend.as_ref()
    }

    pub(crate) fn cancel_grace(&self) -> Option<Duration> {
        self.settings.cancel_grace
    }

    /// Deliver a non-terminal update.
    pub(crate) fn notify(&self, update: TaskUpdate) {
        self.sink.on_task_state_changed(update);
    }

    /// Remove the task from the registry and deliver its terminal update.
    pub(crate) fn finish_task(&self, task_id: u64, update: TaskUpdate) {
        let mut registry = self.lock_registry();

        match registry.get(&update.identifier) {
            Some(entry) if entry.task_id == task_id => {
                registry.remove(&update.identifier);
            }
            _ => {
                warn!(
                    identifier = %update.identifier,
                    task_id,
                    "finished task missing from registry"
                );
            }
        }

        info!(
            identifier = %update.identifier,
            task_id,
            state = %update.state,
            active = registry.len(),
            "download task finished"
        );

        self.sink.on_task_state_changed(update);
        self.sink.on_aggregate_state_changed(registry.len());
    }
}

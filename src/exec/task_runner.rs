// src/exec/task_runner.rs

//! Individual download task runner.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, trace, warn};

use crate::engine::orchestrator::Shared;
use crate::engine::task::Task;
use crate::exec::{ExitStatus, ProcessHandle};
use crate::parse::classify_outcome;

/// Everything a runner needs, moved into its Tokio task.
pub(crate) struct TaskRun {
    pub(crate) shared: Arc<Shared>,
    pub(crate) task_id: u64,
    pub(crate) task: Task,
    pub(crate) args: Vec<String>,
    pub(crate) cancel_rx: oneshot::Receiver<()>,
}

/// Drive one task from `Queued` to a terminal state.
///
/// - Spawn failure: `Failed` without reading anything.
/// - Otherwise every output line goes through the task state machine until
///   the stream ends.
/// - If the cancel channel fires, the process is asked to terminate and
///   reading continues. This holds until the exit status is collected, so a
///   process that closed its output but is still running can be cancelled
///   too. A terminated task is reported `Cancelled` and its exit status is
///   ignored.
pub(crate) async fn run_task(run: TaskRun) {
    let TaskRun {
        shared,
        task_id,
        mut task,
        args,
        mut cancel_rx,
    } = run;

    if cancel_rx.try_recv().is_ok() {
        debug!(
            identifier = %task.identifier(),
            task_id,
            "cancelled before the process was spawned"
        );
        if let Some(update) = task.cancel() {
            shared.finish_task(task_id, update);
        }
        return;
    }

    let mut process = match shared.backend().spawn(&args) {
        Ok(process) => process,
        Err(err) => {
            warn!(
                identifier = %task.identifier(),
                task_id,
                error = %err,
                "failed to spawn download process"
            );
            if let Some(update) = task.fail_to_spawn(&err) {
                shared.finish_task(task_id, update);
            }
            return;
        }
    };

    info!(
        identifier = %task.identifier(),
        task_id,
        pid = ?process.id(),
        "download process started"
    );
    if let Some(update) = task.start() {
        shared.notify(update);
    }

    let mut cancel = CancelState::new(shared.cancel_grace());

    loop {
        tokio::select! {
            line = process.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        trace!(identifier = %task.identifier(), task_id, "output: {}", line);
                        if let Some(update) = task.record_line(&line) {
                            shared.notify(update);
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!(
                            identifier = %task.identifier(),
                            task_id,
                            error = %err,
                            "error reading process output; treating as end of stream"
                        );
                        break;
                    }
                }
            }

            request = &mut cancel_rx, if cancel.listening() => {
                cancel.on_request(request.is_ok(), process.as_mut(), task.identifier(), task_id);
            }

            _ = wait_for_deadline(cancel.kill_deadline), if cancel.kill_pending() => {
                cancel.on_deadline(process.as_mut(), task.identifier(), task_id);
            }
        }
    }

    // The output can close well before the process exits, so cancellation
    // stays live until the exit status is in.
    let status = loop {
        tokio::select! {
            status = process.wait() => {
                break match status {
                    Ok(status) => status,
                    Err(err) => {
                        warn!(
                            identifier = %task.identifier(),
                            task_id,
                            error = %err,
                            "failed to collect process exit status"
                        );
                        ExitStatus::signaled()
                    }
                };
            }

            request = &mut cancel_rx, if cancel.listening() => {
                cancel.on_request(request.is_ok(), process.as_mut(), task.identifier(), task_id);
            }

            _ = wait_for_deadline(cancel.kill_deadline), if cancel.kill_pending() => {
                cancel.on_deadline(process.as_mut(), task.identifier(), task_id);
            }
        }
    };
    drop(process);

    debug!(
        identifier = %task.identifier(),
        task_id,
        exit_code = ?status.code(),
        terminated = cancel.terminated,
        "download process exited"
    );

    let update = if cancel.terminated {
        task.cancel()
    } else {
        let verdict = classify_outcome(status, task.output());
        task.finish(verdict)
    };

    if let Some(update) = update {
        shared.finish_task(task_id, update);
    }
}

/// Cancellation progress of one runner.
struct CancelState {
    grace: Option<Duration>,
    seen: bool,
    terminated: bool,
    killed: bool,
    kill_deadline: Option<Instant>,
}

impl CancelState {
    fn new(grace: Option<Duration>) -> Self {
        Self {
            grace,
            seen: false,
            terminated: false,
            killed: false,
            kill_deadline: None,
        }
    }

    fn listening(&self) -> bool {
        !self.seen
    }

    fn kill_pending(&self) -> bool {
        self.kill_deadline.is_some() && !self.killed
    }

    /// `requested` is false when the sender went away without signalling.
    fn on_request(
        &mut self,
        requested: bool,
        process: &mut dyn ProcessHandle,
        identifier: &str,
        task_id: u64,
    ) {
        self.seen = true;
        if !requested {
            return;
        }

        info!(
            identifier,
            task_id,
            "cancellation requested; signalling process to terminate"
        );
        if let Err(err) = process.terminate() {
            warn!(
                identifier,
                task_id,
                error = %err,
                "failed to signal process termination"
            );
        }
        self.terminated = true;

        // A grace too large to represent is the same as no grace at all.
        self.kill_deadline = self
            .grace
            .and_then(|grace| Instant::now().checked_add(grace));
    }

    fn on_deadline(&mut self, process: &mut dyn ProcessHandle, identifier: &str, task_id: u64) {
        warn!(
            identifier,
            task_id,
            "process still running after cancel grace period; killing"
        );
        if let Err(err) = process.kill() {
            warn!(identifier, task_id, error = %err, "failed to kill process");
        }
        self.killed = true;
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

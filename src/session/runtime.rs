// src/session/runtime.rs

use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::{Orchestrator, OrchestratorEvent};

use super::core::{SessionCore, SessionSummary};

/// Async IO shell around [`SessionCore`].
///
/// Reads the single-consumer event channel, prints the report lines the core
/// produces, and turns an interrupt (Ctrl-C in production) into a
/// `cancel_all` on the orchestrator.
pub struct SessionRuntime {
    core: SessionCore,
    events: mpsc::UnboundedReceiver<OrchestratorEvent>,
    orchestrator: Orchestrator,
}

impl fmt::Debug for SessionRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRuntime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl SessionRuntime {
    pub fn new(
        core: SessionCore,
        events: mpsc::UnboundedReceiver<OrchestratorEvent>,
        orchestrator: Orchestrator,
    ) -> Self {
        Self {
            core,
            events,
            orchestrator,
        }
    }

    /// Run until every tracked item is terminal, cancelling everything on
    /// Ctrl-C.
    pub async fn run(self) -> SessionSummary {
        self.run_until_interrupt(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until every tracked item is terminal. When `interrupt` resolves,
    /// all active downloads are cancelled and the session keeps draining
    /// events until they have all ended.
    pub async fn run_until_interrupt<F>(mut self, interrupt: F) -> SessionSummary
    where
        F: Future<Output = ()>,
    {
        info!(pending = self.core.pending_count(), "download session started");

        let mut interrupt = std::pin::pin!(interrupt);
        let mut interrupted = false;

        while !self.core.is_finished() {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        warn!("event channel closed before all downloads finished");
                        break;
                    };
                    let step = self.core.apply(event);
                    for line in step.lines {
                        println!("{line}");
                    }
                    if step.finished {
                        break;
                    }
                }

                _ = &mut interrupt, if !interrupted => {
                    interrupted = true;
                    println!("Cancelling all downloads...");
                    let signalled = self.orchestrator.cancel_all();
                    info!(signalled, "interrupt received; cancelling downloads");
                }
            }
        }

        info!("download session finished");
        self.core.into_summary()
    }
}

pub mod builders;
pub mod fake_backend;

use std::sync::Once;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{fmt, EnvFilter};

use playlistdl::engine::{OrchestratorEvent, TaskUpdate};
use playlistdl::types::TaskState;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Receive events until `done` returns true for everything received so far.
///
/// Returns every event received, in order. Panics if the channel closes
/// first.
pub async fn collect_until<F>(
    rx: &mut UnboundedReceiver<OrchestratorEvent>,
    mut done: F,
) -> Vec<OrchestratorEvent>
where
    F: FnMut(&[OrchestratorEvent]) -> bool,
{
    let mut events = Vec::new();
    while !done(events.as_slice()) {
        let event = rx.recv().await.expect("event channel closed early");
        events.push(event);
    }
    events
}

/// Receive events until `terminal` terminal task updates have been seen.
pub async fn collect_until_terminal(
    rx: &mut UnboundedReceiver<OrchestratorEvent>,
    terminal: usize,
) -> Vec<OrchestratorEvent> {
    collect_until(rx, |events| terminal_count(events) >= terminal).await
}

/// Receive events until every identifier in `identifiers` has reported
/// `state` at least once.
pub async fn wait_for_state(
    rx: &mut UnboundedReceiver<OrchestratorEvent>,
    identifiers: &[&str],
    state: TaskState,
) -> Vec<OrchestratorEvent> {
    collect_until(rx, |events| {
        identifiers.iter().all(|id| {
            updates_for(events, id)
                .iter()
                .any(|update| update.state == state)
        })
    })
    .await
}

/// Number of terminal task updates in `events`.
pub fn terminal_count(events: &[OrchestratorEvent]) -> usize {
    events
        .iter()
        .filter(|event| {
            matches!(event, OrchestratorEvent::TaskStateChanged(update) if update.state.is_terminal())
        })
        .count()
}

/// Drain whatever is already buffered without waiting.
pub fn drain_ready(rx: &mut UnboundedReceiver<OrchestratorEvent>) -> Vec<OrchestratorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Task updates for one identifier, in delivery order.
pub fn updates_for<'a>(events: &'a [OrchestratorEvent], identifier: &str) -> Vec<&'a TaskUpdate> {
    events
        .iter()
        .filter_map(|event| match event {
            OrchestratorEvent::TaskStateChanged(update) if update.identifier == identifier => {
                Some(update)
            }
            _ => None,
        })
        .collect()
}

/// Every aggregate count reported, in delivery order.
pub fn aggregate_counts(events: &[OrchestratorEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            OrchestratorEvent::AggregateStateChanged { active_count } => Some(*active_count),
            _ => None,
        })
        .collect()
}

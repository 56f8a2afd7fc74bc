#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use playlistdl::engine::{ChannelSink, Orchestrator, OrchestratorSettings};
use playlistdl::errors::SpawnError;
use playlistdl::exec::{CommandBackend, ProcessBackend, ProcessHandle};
use playlistdl::types::{DownloadOptions, TaskState};
use playlistdl_test_utils::{
    collect_until, collect_until_terminal, init_tracing, updates_for, with_timeout,
};

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

async fn read_all(process: &mut Box<dyn ProcessHandle>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = process.next_line().await.unwrap() {
        lines.push(line);
    }
    lines
}

#[tokio::test]
async fn test_stdout_and_stderr_are_merged() {
    init_tracing();
    let backend = CommandBackend::new("sh");
    let mut process = backend
        .spawn(&sh("echo out; echo err >&2; exit 3"))
        .unwrap();

    let mut lines = with_timeout(read_all(&mut process)).await;
    lines.sort();
    assert_eq!(lines, vec!["err".to_string(), "out".to_string()]);

    let status = with_timeout(process.wait()).await.unwrap();
    assert_eq!(status.code(), Some(3));
    assert!(!status.success());
}

#[tokio::test]
async fn test_carriage_returns_split_progress_updates() {
    init_tracing();
    let backend = CommandBackend::new("sh");
    let mut process = backend
        .spawn(&sh(r"printf '[download]  10.0%%\r[download]  55.0%%\r\nlast\r\n'"))
        .unwrap();

    let lines = with_timeout(read_all(&mut process)).await;
    assert_eq!(
        lines,
        vec![
            "[download]  10.0%".to_string(),
            "[download]  55.0%".to_string(),
            "last".to_string(),
        ]
    );
    assert!(with_timeout(process.wait()).await.unwrap().success());
}

#[tokio::test]
async fn test_terminate_ends_a_running_process() {
    init_tracing();
    let backend = CommandBackend::new("sh");
    let mut process = backend.spawn(&sh("exec sleep 30")).unwrap();
    assert!(process.id().is_some());

    process.terminate().unwrap();

    let lines = with_timeout(read_all(&mut process)).await;
    assert!(lines.is_empty());
    let status = with_timeout(process.wait()).await.unwrap();
    assert_eq!(status.code(), None);
}

#[tokio::test]
async fn test_missing_executable_is_a_spawn_error() {
    init_tracing();
    let backend = CommandBackend::new("/definitely/not/a/real/downloader");
    match backend.spawn(&[]) {
        Err(SpawnError::NotFound { program }) => {
            assert!(program.ends_with("downloader"));
        }
        Err(other) => panic!("expected NotFound, got {other:?}"),
        Ok(_) => panic!("expected spawn to fail"),
    }
}

#[test]
fn test_from_path_resolves_known_programs() {
    let backend = CommandBackend::from_path("sh").expect("sh is on PATH");
    assert!(backend.program().is_absolute());
    assert!(CommandBackend::from_path("playlistdl-no-such-program-xyz").is_none());
}

#[tokio::test]
async fn test_orchestrator_runs_a_real_process_end_to_end() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("fake-downloader");
    std::fs::write(
        &script,
        "#!/bin/sh\n\
         echo \"[youtube] $#: args received\"\n\
         echo '[download]  40.0% of 1.00MiB'\n\
         echo '[download] 100% of 1.00MiB in 00:01'\n\
         echo 'WARNING: ignoring post-processing failure' >&2\n\
         exit 1\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let (sink, mut rx) = ChannelSink::new();
    let orch = Orchestrator::new(
        Arc::new(CommandBackend::new(&script)),
        Arc::new(sink),
        OrchestratorSettings {
            cancel_grace: Some(Duration::from_secs(1)),
        },
    );

    orch.dispatch("abc", &DownloadOptions::default());
    let events = with_timeout(collect_until_terminal(&mut rx, 1)).await;

    let updates = updates_for(&events, "abc");
    assert!(updates.iter().any(|u| u.progress == 0.4));
    assert_eq!(updates.last().unwrap().state, TaskState::Completed);
}

#[tokio::test]
async fn test_cancel_reaches_a_process_that_closed_its_output() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("quiet-downloader");
    std::fs::write(
        &script,
        "#!/bin/sh\n\
         echo '[download]  50.0% of 1.00MiB'\n\
         exec >/dev/null 2>&1\n\
         exec sleep 3\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let (sink, mut rx) = ChannelSink::new();
    let orch = Orchestrator::new(
        Arc::new(CommandBackend::new(&script)),
        Arc::new(sink),
        OrchestratorSettings::default(),
    );

    orch.dispatch("abc", &DownloadOptions::default());
    with_timeout(collect_until(&mut rx, |events| {
        updates_for(events, "abc").iter().any(|u| u.progress == 0.5)
    }))
    .await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let started = std::time::Instant::now();
    assert!(orch.cancel("abc"));

    let events = with_timeout(collect_until_terminal(&mut rx, 1)).await;
    assert_eq!(
        updates_for(&events, "abc").last().unwrap().state,
        TaskState::Cancelled
    );
    assert!(started.elapsed() < Duration::from_secs(2));
}

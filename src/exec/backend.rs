// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! Task runners never touch `tokio::process` directly; they go through a
//! [`ProcessBackend`], which turns an argument list into a [`ProcessHandle`]:
//! a readable line stream plus a way to terminate the process and collect its
//! exit status.
//!
//! - [`CommandBackend`](super::process::CommandBackend) is the production
//!   implementation that runs the real downloader executable.
//! - Tests provide scripted backends that replay canned output without
//!   spawning anything.

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;

use crate::errors::SpawnError;

/// Boxed, sendable future returned by [`ProcessHandle`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Exit status of a finished download process.
///
/// `code` is `None` when the process was ended by a signal or when the status
/// could not be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    code: Option<i32>,
}

impl ExitStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Status of a process that did not exit on its own.
    pub fn signaled() -> Self {
        Self { code: None }
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("no exit code (terminated by signal)"),
        }
    }
}

/// A spawned download process, exclusively owned by one task runner.
pub trait ProcessHandle: Send {
    /// Next line of output, or `None` once the stream has ended.
    ///
    /// Must be cancel-safe: the runner polls it inside `tokio::select!`, and
    /// dropping the future before it completes must not lose a line.
    fn next_line(&mut self) -> BoxFuture<'_, io::Result<Option<String>>>;

    /// Ask the process to terminate (SIGTERM on Unix). Does not wait.
    fn terminate(&mut self) -> io::Result<()>;

    /// Forcefully kill the process. Does not wait.
    fn kill(&mut self) -> io::Result<()>;

    /// Wait for the process to exit and return its status.
    fn wait(&mut self) -> BoxFuture<'_, io::Result<ExitStatus>>;

    /// OS process id, when there is one.
    fn id(&self) -> Option<u32> {
        None
    }
}

/// Trait abstracting how download processes are started.
pub trait ProcessBackend: Send + Sync {
    /// Start a process with the given arguments.
    ///
    /// Failing here (missing executable, rejected arguments) sends the task
    /// straight to `Failed`; it never affects other tasks.
    fn spawn(&self, args: &[String]) -> Result<Box<dyn ProcessHandle>, SpawnError>;
}

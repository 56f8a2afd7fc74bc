// src/exec/process.rs

//! Production process backend built on `tokio::process`.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::SpawnError;
use crate::exec::backend::{BoxFuture, ExitStatus, ProcessBackend, ProcessHandle};

/// Lines buffered between the pipe readers and the task runner.
const LINE_BUFFER: usize = 64;

/// Runs the downloader executable with piped output.
///
/// stdout and stderr are merged into a single line stream, in the order the
/// lines arrive. Carriage-return separated progress updates are split into
/// separate lines.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: PathBuf,
}

impl CommandBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `name` through `PATH`.
    pub fn from_path(name: &str) -> Option<Self> {
        which::which(name).ok().map(Self::new)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ProcessBackend for CommandBackend {
    fn spawn(&self, args: &[String]) -> Result<Box<dyn ProcessHandle>, SpawnError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| SpawnError::from_io(&self.program, e))?;

        debug!(
            program = %self.program.display(),
            pid = ?child.id(),
            "spawned download process"
        );

        let (tx, rx) = mpsc::channel::<String>(LINE_BUFFER);

        if let Some(stdout) = child.stdout.take() {
            spawn_line_forwarder(stdout, tx.clone(), "stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_forwarder(stderr, tx, "stderr");
        }

        Ok(Box::new(ChildProcess { child, lines: rx }))
    }
}

/// Forward every line of `reader` into `tx` until EOF or until the receiver
/// is gone.
fn spawn_line_forwarder<R>(reader: R, tx: mpsc::Sender<String>, pipe: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut segments = BufReader::new(reader).split(b'\n');

        loop {
            let bytes = match segments.next_segment().await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => break,
                Err(e) => {
                    debug!(pipe, error = %e, "error reading process output; closing pipe");
                    break;
                }
            };

            let text = String::from_utf8_lossy(&bytes);
            let text = text.strip_suffix('\r').unwrap_or(&text);

            let lines: Vec<&str> = if text.contains('\r') {
                text.split('\r').filter(|s| !s.trim().is_empty()).collect()
            } else {
                vec![text]
            };

            for line in lines {
                if tx.send(line.to_string()).await.is_err() {
                    return;
                }
            }
        }

        debug!(pipe, "process pipe closed");
    });
}

struct ChildProcess {
    child: Child,
    lines: mpsc::Receiver<String>,
}

impl ProcessHandle for ChildProcess {
    fn next_line(&mut self) -> BoxFuture<'_, io::Result<Option<String>>> {
        Box::pin(async move { Ok(self.lines.recv().await) })
    }

    fn terminate(&mut self) -> io::Result<()> {
        #[cfg(unix)]
        {
            let Some(pid) = self.child.id() else {
                // Already reaped; nothing left to signal.
                return Ok(());
            };
            let pid = libc::pid_t::try_from(pid)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            // SAFETY: `kill` has no memory-safety preconditions; `pid` belongs to
            // a child we have not reaped yet.
            let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
            if rc == 0 {
                Ok(())
            } else {
                Err(io::Error::last_os_error())
            }
        }

        #[cfg(not(unix))]
        {
            self.child.start_kill()
        }
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    fn wait(&mut self) -> BoxFuture<'_, io::Result<ExitStatus>> {
        Box::pin(async move { self.child.wait().await.map(ExitStatus::from) })
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use playlistdl::errors::SpawnError;
use playlistdl::exec::{BoxFuture, ExitStatus, ProcessBackend, ProcessHandle};

/// Canned behaviour of one fake download process.
#[derive(Debug, Clone)]
pub struct Script {
    pub lines: Vec<String>,
    pub exit_code: i32,
    /// Reject the spawn with this message instead of starting a process.
    pub spawn_error: Option<String>,
    /// After the last line, keep the stream open until terminated or killed.
    pub hold_open: bool,
    /// Only `kill` ends the process; `terminate` is recorded but ignored.
    pub ignore_terminate: bool,
    /// Pause before each line.
    pub line_delay: Option<Duration>,
    /// Keep running this long after the output has closed before exiting.
    pub exit_delay: Option<Duration>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            exit_code: 0,
            spawn_error: None,
            hold_open: false,
            ignore_terminate: false,
            line_delay: None,
            exit_delay: None,
        }
    }
}

#[derive(Default)]
struct Calls {
    spawned: Vec<String>,
    args: HashMap<String, Vec<String>>,
    terminated: HashMap<String, usize>,
    killed: HashMap<String, usize>,
}

/// A fake process backend that:
/// - picks a [`Script`] by the last argument (the identifier)
/// - records spawns, argument lists, terminate and kill calls
/// - never starts a real process.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    fallback: Script,
    calls: Arc<Mutex<Calls>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script used for identifiers without their own script.
    pub fn with_fallback(mut self, script: Script) -> Self {
        self.fallback = script;
        self
    }

    pub fn with_script(self, identifier: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(identifier.to_string(), script);
        self
    }

    /// Identifiers in spawn order, including rejected spawns.
    pub fn spawned(&self) -> Vec<String> {
        self.calls.lock().unwrap().spawned.clone()
    }

    pub fn spawn_count(&self, identifier: &str) -> usize {
        self.spawned().iter().filter(|id| *id == identifier).count()
    }

    /// Arguments of the most recent spawn for `identifier`.
    pub fn args_for(&self, identifier: &str) -> Option<Vec<String>> {
        self.calls.lock().unwrap().args.get(identifier).cloned()
    }

    pub fn terminate_count(&self, identifier: &str) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.terminated.get(identifier).copied().unwrap_or(0)
    }

    pub fn kill_count(&self, identifier: &str) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.killed.get(identifier).copied().unwrap_or(0)
    }
}

impl ProcessBackend for ScriptedBackend {
    fn spawn(&self, args: &[String]) -> Result<Box<dyn ProcessHandle>, SpawnError> {
        let identifier = args.last().cloned().unwrap_or_default();
        {
            let mut calls = self.calls.lock().unwrap();
            calls.spawned.push(identifier.clone());
            calls.args.insert(identifier.clone(), args.to_vec());
        }

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&identifier)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());

        if let Some(message) = script.spawn_error {
            return Err(SpawnError::Rejected(message));
        }

        Ok(Box::new(ScriptedProcess {
            identifier,
            lines: script.lines.into(),
            exit_code: script.exit_code,
            hold_open: script.hold_open,
            ignore_terminate: script.ignore_terminate,
            line_delay: script.line_delay,
            exit_delay: script.exit_delay,
            stopped: false,
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct ScriptedProcess {
    identifier: String,
    lines: VecDeque<String>,
    exit_code: i32,
    hold_open: bool,
    ignore_terminate: bool,
    line_delay: Option<Duration>,
    exit_delay: Option<Duration>,
    stopped: bool,
    calls: Arc<Mutex<Calls>>,
}

impl ProcessHandle for ScriptedProcess {
    fn next_line(&mut self) -> BoxFuture<'_, io::Result<Option<String>>> {
        Box::pin(async move {
            if self.stopped {
                return Ok(None);
            }
            if !self.lines.is_empty() {
                if let Some(delay) = self.line_delay {
                    tokio::time::sleep(delay).await;
                }
                // Popped only after the last await point, so dropping this
                // future never loses a line.
                return Ok(self.lines.pop_front());
            }
            if self.hold_open {
                std::future::pending::<()>().await;
            }
            Ok(None)
        })
    }

    fn terminate(&mut self) -> io::Result<()> {
        let mut calls = self.calls.lock().unwrap();
        *calls.terminated.entry(self.identifier.clone()).or_default() += 1;
        if !self.ignore_terminate {
            self.stopped = true;
        }
        Ok(())
    }

    fn kill(&mut self) -> io::Result<()> {
        let mut calls = self.calls.lock().unwrap();
        *calls.killed.entry(self.identifier.clone()).or_default() += 1;
        self.stopped = true;
        Ok(())
    }

    fn wait(&mut self) -> BoxFuture<'_, io::Result<ExitStatus>> {
        Box::pin(async move {
            if !self.stopped {
                if let Some(delay) = self.exit_delay {
                    tokio::time::sleep(delay).await;
                }
            }
            if self.stopped {
                Ok(ExitStatus::signaled())
            } else {
                Ok(ExitStatus::from_code(self.exit_code))
            }
        })
    }
}

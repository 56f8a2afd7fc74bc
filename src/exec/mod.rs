// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] defines the [`ProcessBackend`] / [`ProcessHandle`] seam and
//!   the backend-neutral [`ExitStatus`].
//! - [`process`] is the production backend on top of `tokio::process`.
//! - `task_runner` is the per-task reader loop: it spawns the process,
//!   feeds output lines to the task state machine, handles cancellation and
//!   classifies the outcome.

pub mod backend;
pub mod process;
pub(crate) mod task_runner;

pub use backend::{BoxFuture, ExitStatus, ProcessBackend, ProcessHandle};
pub use process::CommandBackend;

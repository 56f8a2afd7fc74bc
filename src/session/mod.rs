// src/session/mod.rs

//! CLI download session.
//!
//! The pure core lives in [`core`]; the async shell that owns the event
//! channel and the interrupt handling is in [`runtime`].

pub mod core;
pub mod runtime;

pub use self::core::{SessionCore, SessionStep, SessionSummary};
pub use runtime::SessionRuntime;

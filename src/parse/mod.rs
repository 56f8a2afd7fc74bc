// src/parse/mod.rs

//! Interpretation of the downloader's text output.
//!
//! Both halves are pure functions with no IO:
//! - [`progress`] maps one output line to a [`ProgressEvent`].
//! - [`outcome`] decides the final [`Verdict`] of a finished process from its
//!   exit status and everything it printed.

pub mod outcome;
pub mod progress;

pub use outcome::{Verdict, classify_outcome};
pub use progress::{ProgressEvent, parse_progress_line};

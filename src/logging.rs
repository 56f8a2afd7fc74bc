// src/logging.rs

//! Diagnostic logging for `playlistdl`.
//!
//! The filter comes from, in order:
//! 1. the `--log-level` flag, applied to every target
//! 2. `PLAYLISTDL_LOG`, read as `EnvFilter` directives
//!    (`debug`, `playlistdl::exec=trace,warn`, ...)
//! 3. `warn`
//!
//! Diagnostics go to STDERR; STDOUT carries only the progress report.

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "PLAYLISTDL_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Install the global subscriber. Call once, before any downloads start.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env_value.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

/// Resolve the filter for a flag value and the raw `PLAYLISTDL_LOG` value.
///
/// A malformed environment value is an error rather than a silent fallback.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(level.as_directive()));
    }

    match env_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} value '{directives}'")),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVES)),
    }
}

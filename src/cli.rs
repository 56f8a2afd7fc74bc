// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `playlistdl`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "playlistdl",
    version,
    about = "Download the items of a playlist in parallel with yt-dlp.",
    long_about = None
)]
pub struct CliArgs {
    /// Playlist (or single item) URL.
    pub url: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `playlistdl.toml` in the current working directory, used only
    /// if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to save downloads into (overrides the config).
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Extract audio only.
    #[arg(long)]
    pub audio_only: bool,

    /// Audio codec used with `--audio-only` (e.g. mp3, m4a, opus).
    #[arg(long, value_name = "FORMAT")]
    pub audio_format: Option<String>,

    /// Explicit format selector passed to the downloader's `-f`.
    #[arg(long = "format", value_name = "SELECTOR", conflicts_with = "audio_only")]
    pub format_selector: Option<String>,

    /// Items to download: `all`, or numbers and ranges such as `1,5,8-10`.
    #[arg(long, value_name = "ITEMS", default_value = "all")]
    pub select: String,

    /// List the playlist items and exit without downloading.
    #[arg(long)]
    pub list: bool,

    /// Downloader executable (overrides the config).
    #[arg(long, value_name = "PATH")]
    pub binary: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PLAYLISTDL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The level as a filter directive covering every target.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod parse;
pub mod playlist;
pub mod session;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, default_config_path, load_or_default};
use crate::engine::{ChannelSink, Orchestrator, OrchestratorSettings};
use crate::errors::PlaylistDlError;
use crate::exec::CommandBackend;
use crate::playlist::{PlaylistItem, fetch_playlist_items, parse_selection};
use crate::session::{SessionCore, SessionRuntime, SessionSummary};
use crate::types::{AUDIO_FORMATS, DownloadOptions, FormatSelection};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - downloader discovery
/// - playlist lookup and selection
/// - the orchestrator and the download session (with Ctrl-C handling)
pub async fn run(args: CliArgs) -> Result<()> {
    let explicit_config = args.config.is_some();
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_or_default(&config_path, explicit_config)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let options = effective_options(&cfg, &args)?;

    let binary = args
        .binary
        .clone()
        .unwrap_or_else(|| cfg.downloader.binary.clone());
    let backend =
        CommandBackend::from_path(&binary).ok_or(PlaylistDlError::BinaryNotFound(binary))?;
    info!(program = %backend.program().display(), "using downloader");

    println!("Fetching playlist info...");
    let items = fetch_playlist_items(backend.program(), &args.url).await;
    if items.is_empty() {
        bail!("could not find any items at {}", args.url);
    }

    if args.list {
        print_items(&items);
        return Ok(());
    }

    let selected: Vec<PlaylistItem> = parse_selection(&args.select, items.len())?
        .into_iter()
        .map(|index| items[index].clone())
        .collect();

    tokio::fs::create_dir_all(&options.output_dir)
        .await
        .with_context(|| format!("creating output directory {}", options.output_dir.display()))?;

    println!(
        "Downloading {} of {} item(s) into {}",
        selected.len(),
        items.len(),
        options.output_dir.display()
    );

    let (sink, events) = ChannelSink::new();
    let orchestrator = Orchestrator::new(
        Arc::new(backend),
        Arc::new(sink),
        OrchestratorSettings {
            cancel_grace: cfg.cancel_grace(),
        },
    );

    let core = SessionCore::new(&selected);
    let started = orchestrator.dispatch_all(
        selected.iter().map(|item| item.identifier.clone()),
        &options,
    );
    info!(started, "downloads dispatched");

    let summary = SessionRuntime::new(core, events, orchestrator).run().await;
    print_summary(&summary);

    if !summary.failed.is_empty() {
        bail!("{} download(s) failed", summary.failed.len());
    }
    Ok(())
}

/// Apply CLI overrides on top of the config file's download options.
pub fn effective_options(cfg: &ConfigFile, args: &CliArgs) -> errors::Result<DownloadOptions> {
    let mut options = cfg.download_options();

    if let Some(dir) = &args.output_dir {
        options.output_dir = dir.clone();
    }

    if let Some(selector) = &args.format_selector {
        options.format = FormatSelection::Selector(selector.clone());
    }

    let audio_requested =
        args.audio_only || matches!(options.format, FormatSelection::AudioOnly { .. });
    if audio_requested && args.format_selector.is_none() {
        let audio_format = args
            .audio_format
            .clone()
            .unwrap_or_else(|| cfg.format.audio_format.clone());
        if !AUDIO_FORMATS.contains(&audio_format.as_str()) {
            return Err(PlaylistDlError::ConfigError(format!(
                "unsupported audio format '{}' (expected one of: {})",
                audio_format,
                AUDIO_FORMATS.join(", ")
            )));
        }
        options.format = FormatSelection::AudioOnly { audio_format };
    }

    Ok(options)
}

fn print_items(items: &[PlaylistItem]) {
    println!("------------------ Items Found ------------------");
    for (i, item) in items.iter().enumerate() {
        println!("[{:2}] {}", i + 1, item.title);
    }
    println!("-------------------------------------------------");
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!(
        "{} completed, {} failed, {} cancelled",
        summary.completed,
        summary.failed.len(),
        summary.cancelled
    );
    for (title, reason) in &summary.failed {
        println!("  failed: {title}");
        for line in reason.lines().rev().take(3).collect::<Vec<_>>().into_iter().rev() {
            println!("      {line}");
        }
    }
}

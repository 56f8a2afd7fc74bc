// src/playlist/mod.rs

//! Enumerating the items of a remote collection.
//!
//! The downloader is run once in flat-playlist mode, which prints one JSON
//! object per item. Lines that are not valid item objects are skipped, and a
//! failed lookup yields an empty list: "no items found" is the only failure
//! the caller sees.

pub mod selection;

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

pub use selection::parse_selection;

/// One entry of a collection, in collection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub title: String,
    /// Identifier handed to the downloader for this item.
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
struct FlatEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Parse one line of `--flat-playlist -j` output.
///
/// The identifier is the entry's `url`, falling back to its `id`; the title
/// falls back to the identifier.
pub fn parse_flat_playlist_line(line: &str) -> Option<PlaylistItem> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let entry: FlatEntry = match serde_json::from_str(line) {
        Ok(entry) => entry,
        Err(e) => {
            debug!(error = %e, "skipping non-JSON playlist line");
            return None;
        }
    };

    let identifier = entry
        .url
        .or(entry.id)
        .filter(|s| !s.trim().is_empty())?;
    let title = entry
        .title
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| identifier.clone());

    Some(PlaylistItem { title, identifier })
}

/// Parse the complete output of a flat-playlist run.
pub fn parse_flat_playlist_output(output: &str) -> Vec<PlaylistItem> {
    output.lines().filter_map(parse_flat_playlist_line).collect()
}

/// Ask the downloader for the items of `url`.
///
/// Never fails: errors are logged and reported as an empty list.
pub async fn fetch_playlist_items(program: &Path, url: &str) -> Vec<PlaylistItem> {
    match fetch_inner(program, url).await {
        Ok(items) => {
            info!(url, count = items.len(), "playlist lookup finished");
            items
        }
        Err(e) => {
            warn!(url, error = %e, "playlist lookup failed; treating as empty");
            Vec::new()
        }
    }
}

async fn fetch_inner(program: &Path, url: &str) -> anyhow::Result<Vec<PlaylistItem>> {
    use anyhow::Context;

    let mut child = Command::new(program)
        .args(["--flat-playlist", "-j", "--no-warnings", "--", url])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning '{}' for playlist lookup", program.display()))?;

    let stdout = child
        .stdout
        .take()
        .context("playlist lookup process has no stdout pipe")?;

    let mut items = Vec::new();
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await.context("reading playlist output")? {
        if let Some(item) = parse_flat_playlist_line(&line) {
            items.push(item);
        }
    }

    let status = child.wait().await.context("waiting for playlist lookup")?;
    if !status.success() {
        debug!(url, status = %status, "playlist lookup exited unsuccessfully");
    }

    Ok(items)
}

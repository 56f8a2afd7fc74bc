// src/parse/progress.rs

use std::sync::LazyLock;

use regex::Regex;

/// Structured interpretation of one line of downloader output.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Download fraction in `[0.0, 1.0]`.
    PercentUpdate(f64),
    /// Any other non-empty line, trimmed.
    StatusMessage(String),
    /// Blank line; carries no information.
    Unrecognized,
}

/// `[download]` tag, one or more whitespace characters, a number, `%`.
///
/// The numeric capture is deliberately loose (`1.2.3` matches) so that a
/// garbled number degrades to a status message instead of being skipped.
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[download\]\s+([0-9][0-9.]*)%").expect("progress regex is valid")
});

/// Map a raw output line to a [`ProgressEvent`]. Never fails.
pub fn parse_progress_line(line: &str) -> ProgressEvent {
    let trimmed = line.trim();

    if let Some(caps) = PERCENT_RE.captures(trimmed) {
        return match caps[1].parse::<f64>() {
            Ok(value) if value.is_finite() => {
                ProgressEvent::PercentUpdate((value / 100.0).clamp(0.0, 1.0))
            }
            _ => ProgressEvent::StatusMessage(trimmed.to_string()),
        };
    }

    if trimmed.is_empty() {
        ProgressEvent::Unrecognized
    } else {
        ProgressEvent::StatusMessage(trimmed.to_string())
    }
}

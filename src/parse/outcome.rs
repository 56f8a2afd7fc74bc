// src/parse/outcome.rs

//! Final success/failure decision for a finished download process.
//!
//! The downloader regularly exits non-zero after the file was already written
//! (for example when a post-processing step only warns), so the exit status is
//! checked first and then the output is searched for evidence that an
//! artifact was produced. Only positive evidence overrides a failing status;
//! the absence of error text never does.

use std::sync::LazyLock;

use regex::Regex;

use crate::exec::ExitStatus;

/// Final verdict for a terminated task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(String),
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }
}

/// Success-evidence markers, checked in this order; first match wins.
static SUCCESS_MARKERS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("download complete", r"\[download\]\s+100(?:\.0+)?%"),
        ("audio extracted", r"\[ExtractAudio\] Destination: "),
        ("format converted", r"\[\w*Convertor\].*Destination: "),
        ("streams merged", r#"\[Merger\] Merging formats into "#),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("marker regex is valid")))
    .collect()
});

/// Decide the verdict from the exit status and the full output.
pub fn classify_outcome(status: ExitStatus, output: &[String]) -> Verdict {
    if status.success() {
        return Verdict::Success;
    }

    if success_evidence(output).is_some() {
        return Verdict::Success;
    }

    let reason = output.join("\n").trim().to_string();
    if reason.is_empty() {
        Verdict::Failure(format!(
            "download process failed with {status} and produced no output"
        ))
    } else {
        Verdict::Failure(reason)
    }
}

/// Name of the first success marker found in `output`, if any.
pub fn success_evidence(output: &[String]) -> Option<&'static str> {
    SUCCESS_MARKERS.iter().find_map(|(name, re)| {
        output
            .iter()
            .any(|line| re.is_match(line))
            .then_some(*name)
    })
}

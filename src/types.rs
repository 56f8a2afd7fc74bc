use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Lifecycle state of a single download task.
///
/// - `Queued`: registered with the orchestrator, process not spawned yet.
/// - `Running`: process spawned and its output is being read.
/// - `Completed` / `Failed` / `Cancelled`: terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Cancelled
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Audio codecs accepted by the downloader's `--audio-format` flag.
pub const AUDIO_FORMATS: &[&str] = &[
    "best", "aac", "alac", "flac", "m4a", "mp3", "opus", "vorbis", "wav",
];

/// Which streams the downloader should fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormatSelection {
    /// Let the downloader pick its default (best) format.
    #[default]
    Default,
    /// Extract audio only, converted to the given codec.
    AudioOnly { audio_format: String },
    /// Pass an explicit format selector through `-f`.
    Selector(String),
}

/// Per-dispatch options that shape the downloader command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub output_dir: PathBuf,
    pub output_template: String,
    pub format: FormatSelection,
    pub extra_args: Vec<String>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
            format: FormatSelection::Default,
            extra_args: Vec::new(),
        }
    }
}

pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

impl DownloadOptions {
    /// Full output path template handed to `-o`.
    pub fn output_path_template(&self) -> String {
        self.output_dir
            .join(&self.output_template)
            .to_string_lossy()
            .into_owned()
    }

    /// Build the downloader arguments for one identifier.
    ///
    /// The identifier always comes last, after a `--` separator, so ids that
    /// start with `-` are never read as flags.
    pub fn command_args(&self, identifier: &str) -> Vec<String> {
        let mut args = vec![
            "--newline".to_string(),
            "--progress".to_string(),
            "-o".to_string(),
            self.output_path_template(),
        ];

        match &self.format {
            FormatSelection::Default => {}
            FormatSelection::AudioOnly { audio_format } => {
                args.push("-x".to_string());
                args.push("--audio-format".to_string());
                args.push(audio_format.clone());
            }
            FormatSelection::Selector(selector) => {
                args.push("-f".to_string());
                args.push(selector.clone());
            }
        }

        args.extend(self.extra_args.iter().cloned());
        args.push("--".to_string());
        args.push(identifier.to_string());
        args
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let seconds_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}

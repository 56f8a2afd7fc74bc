// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{DEFAULT_OUTPUT_TEMPLATE, DownloadOptions, FormatSelection};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [downloader]
/// binary = "yt-dlp"
/// output_dir = "downloads"
/// output_template = "%(title)s.%(ext)s"
/// cancel_grace = "5s"
///
/// [format]
/// audio_only = true
/// audio_format = "mp3"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub downloader: DownloaderSection,

    #[serde(default)]
    pub format: FormatSection,
}

/// `[downloader]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloaderSection {
    /// Executable name (looked up in `PATH`) or path.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Directory the downloads are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output file name template, relative to `output_dir`.
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Extra arguments appended before the item identifier.
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Duration string (e.g. `"5s"`). When set, a cancelled process that is
    /// still producing output this long after the termination signal is
    /// force-killed.
    #[serde(default)]
    pub cancel_grace: Option<String>,
}

fn default_binary() -> String {
    "yt-dlp".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_template() -> String {
    DEFAULT_OUTPUT_TEMPLATE.to_string()
}

impl Default for DownloaderSection {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            output_dir: default_output_dir(),
            output_template: default_output_template(),
            extra_args: Vec::new(),
            cancel_grace: None,
        }
    }
}

/// `[format]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSection {
    /// Extract audio only.
    #[serde(default)]
    pub audio_only: bool,

    /// Codec used with `audio_only`.
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Explicit format selector (`-f`); exclusive with `audio_only`.
    #[serde(default)]
    pub selector: Option<String>,
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

impl Default for FormatSection {
    fn default() -> Self {
        Self {
            audio_only: false,
            audio_format: default_audio_format(),
            selector: None,
        }
    }
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so holding one means the invariants were checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub downloader: DownloaderSection,
    pub format: FormatSection,
    cancel_grace: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        downloader: DownloaderSection,
        format: FormatSection,
        cancel_grace: Option<Duration>,
    ) -> Self {
        Self {
            downloader,
            format,
            cancel_grace,
        }
    }

    pub fn cancel_grace(&self) -> Option<Duration> {
        self.cancel_grace
    }

    pub fn format_selection(&self) -> FormatSelection {
        if self.format.audio_only {
            FormatSelection::AudioOnly {
                audio_format: self.format.audio_format.clone(),
            }
        } else if let Some(selector) = &self.format.selector {
            FormatSelection::Selector(selector.clone())
        } else {
            FormatSelection::Default
        }
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            output_dir: self.downloader.output_dir.clone(),
            output_template: self.downloader.output_template.clone(),
            format: self.format_selection(),
            extra_args: self.downloader.extra_args.clone(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(DownloaderSection::default(), FormatSection::default(), None)
    }
}

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use playlistdl::config::{ConfigFile, RawConfigFile};
use playlistdl::playlist::PlaylistItem;

use crate::fake_backend::Script;

/// Builder for [`Script`].
pub struct ScriptBuilder {
    script: Script,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self {
            script: Script::default(),
        }
    }

    pub fn line(mut self, line: &str) -> Self {
        self.script.lines.push(line.to_string());
        self
    }

    pub fn lines(mut self, lines: &[&str]) -> Self {
        self.script
            .lines
            .extend(lines.iter().map(|line| line.to_string()));
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.script.exit_code = code;
        self
    }

    pub fn spawn_error(mut self, message: &str) -> Self {
        self.script.spawn_error = Some(message.to_string());
        self
    }

    pub fn hold_open(mut self) -> Self {
        self.script.hold_open = true;
        self
    }

    pub fn ignore_terminate(mut self) -> Self {
        self.script.ignore_terminate = true;
        self
    }

    pub fn line_delay(mut self, delay: Duration) -> Self {
        self.script.line_delay = Some(delay);
        self
    }

    pub fn exit_delay(mut self, delay: Duration) -> Self {
        self.script.exit_delay = Some(delay);
        self
    }

    pub fn build(self) -> Script {
        self.script
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A download that reports progress and finishes cleanly.
pub fn successful_download() -> Script {
    ScriptBuilder::new()
        .lines(&[
            "[youtube] abc: Downloading webpage",
            "[download]  25.0% of 10.00MiB at 1.00MiB/s ETA 00:07",
            "[download]  50.0% of 10.00MiB at 1.00MiB/s ETA 00:05",
            "[download] 100% of 10.00MiB in 00:10",
        ])
        .build()
}

/// A download that never finishes on its own.
pub fn stalled_download() -> Script {
    ScriptBuilder::new()
        .line("[download]  10.0% of 10.00MiB at 1.00MiB/s ETA 00:09")
        .hold_open()
        .build()
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn binary(mut self, binary: &str) -> Self {
        self.config.downloader.binary = binary.to_string();
        self
    }

    pub fn output_dir(mut self, dir: &str) -> Self {
        self.config.downloader.output_dir = PathBuf::from(dir);
        self
    }

    pub fn extra_arg(mut self, arg: &str) -> Self {
        self.config.downloader.extra_args.push(arg.to_string());
        self
    }

    pub fn cancel_grace(mut self, grace: &str) -> Self {
        self.config.downloader.cancel_grace = Some(grace.to_string());
        self
    }

    pub fn audio_only(mut self, audio_format: &str) -> Self {
        self.config.format.audio_only = true;
        self.config.format.audio_format = audio_format.to_string();
        self
    }

    pub fn selector(mut self, selector: &str) -> Self {
        self.config.format.selector = Some(selector.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Playlist items titled `"Item N"` with identifiers `"idN"`, numbered from 1.
pub fn playlist_items(count: usize) -> Vec<PlaylistItem> {
    (1..=count)
        .map(|n| PlaylistItem {
            title: format!("Item {n}"),
            identifier: format!("id{n}"),
        })
        .collect()
}

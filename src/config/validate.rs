// src/config/validate.rs

use std::path::Path;
use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PlaylistDlError, Result};
use crate::types::{AUDIO_FORMATS, parse_duration};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PlaylistDlError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let cancel_grace = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.downloader, raw.format, cancel_grace))
    }
}

/// Check the raw config and return the parsed cancel grace period.
fn validate_raw_config(cfg: &RawConfigFile) -> Result<Option<Duration>> {
    validate_downloader(cfg)?;
    validate_format(cfg)?;
    parse_cancel_grace(cfg)
}

fn validate_downloader(cfg: &RawConfigFile) -> Result<()> {
    if cfg.downloader.binary.trim().is_empty() {
        return Err(PlaylistDlError::ConfigError(
            "[downloader].binary must not be empty".to_string(),
        ));
    }

    let template = cfg.downloader.output_template.trim();
    if template.is_empty() {
        return Err(PlaylistDlError::ConfigError(
            "[downloader].output_template must not be empty".to_string(),
        ));
    }
    if Path::new(template).is_absolute() {
        return Err(PlaylistDlError::ConfigError(format!(
            "[downloader].output_template must be relative to output_dir (got '{}')",
            template
        )));
    }

    Ok(())
}

fn validate_format(cfg: &RawConfigFile) -> Result<()> {
    let format = &cfg.format;

    if !AUDIO_FORMATS.contains(&format.audio_format.as_str()) {
        return Err(PlaylistDlError::ConfigError(format!(
            "[format].audio_format '{}' is not supported (expected one of: {})",
            format.audio_format,
            AUDIO_FORMATS.join(", ")
        )));
    }

    if format.audio_only && format.selector.is_some() {
        return Err(PlaylistDlError::ConfigError(
            "[format].selector cannot be combined with audio_only = true".to_string(),
        ));
    }

    if let Some(selector) = &format.selector {
        if selector.trim().is_empty() {
            return Err(PlaylistDlError::ConfigError(
                "[format].selector must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn parse_cancel_grace(cfg: &RawConfigFile) -> Result<Option<Duration>> {
    let Some(raw) = cfg.downloader.cancel_grace.as_deref() else {
        return Ok(None);
    };

    let grace = parse_duration(raw).map_err(|e| {
        PlaylistDlError::ConfigError(format!("[downloader].cancel_grace: {e}"))
    })?;

    if grace.is_zero() {
        return Err(PlaylistDlError::ConfigError(
            "[downloader].cancel_grace must be greater than zero".to_string(),
        ));
    }

    Ok(Some(grace))
}

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::{NamedTempFile, TempDir};

use playlistdl::config::{ConfigFile, load_and_validate, load_or_default};
use playlistdl::errors::PlaylistDlError;
use playlistdl::types::FormatSelection;
use playlistdl_test_utils::builders::ConfigFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(contents: &str) -> String {
    let file = write_config(contents);
    match load_and_validate(file.path()) {
        Err(PlaylistDlError::ConfigError(msg)) => msg,
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_full_config_is_loaded() {
    let file = write_config(
        r#"
[downloader]
binary = "/opt/bin/yt-dlp"
output_dir = "music"
output_template = "%(playlist_index)s - %(title)s.%(ext)s"
extra_args = ["--no-mtime"]
cancel_grace = "5s"

[format]
audio_only = true
audio_format = "opus"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.downloader.binary, "/opt/bin/yt-dlp");
    assert_eq!(cfg.cancel_grace(), Some(Duration::from_secs(5)));

    let options = cfg.download_options();
    assert_eq!(options.output_dir, PathBuf::from("music"));
    assert_eq!(options.extra_args, vec!["--no-mtime".to_string()]);
    assert_eq!(
        options.format,
        FormatSelection::AudioOnly {
            audio_format: "opus".to_string()
        }
    );
}

#[test]
fn test_empty_config_uses_defaults() {
    let file = write_config("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.downloader.binary, "yt-dlp");
    assert_eq!(cfg.cancel_grace(), None);
    assert_eq!(cfg.format_selection(), FormatSelection::Default);
    assert_eq!(cfg.download_options().output_path_template(), "./%(title)s.%(ext)s");
}

#[test]
fn test_selector_is_passed_through() {
    let file = write_config(
        r#"
[format]
selector = "bestvideo[height<=720]+bestaudio"
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(
        cfg.format_selection(),
        FormatSelection::Selector("bestvideo[height<=720]+bestaudio".to_string())
    );
}

#[test]
fn test_unknown_field_is_a_toml_error() {
    let file = write_config(
        r#"
[downloader]
binray = "yt-dlp"
"#,
    );
    match load_and_validate(file.path()) {
        Err(PlaylistDlError::TomlError(e)) => {
            assert!(e.to_string().contains("binray"));
        }
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unsupported_audio_format_is_rejected() {
    let msg = expect_config_error(
        r#"
[format]
audio_only = true
audio_format = "mp5"
"#,
    );
    assert!(msg.contains("[format].audio_format"));
    assert!(msg.contains("mp5"));
}

#[test]
fn test_selector_with_audio_only_is_rejected() {
    let msg = expect_config_error(
        r#"
[format]
audio_only = true
selector = "best"
"#,
    );
    assert!(msg.contains("cannot be combined"));
}

#[test]
fn test_blank_binary_and_absolute_template_are_rejected() {
    let msg = expect_config_error(
        r#"
[downloader]
binary = "  "
"#,
    );
    assert!(msg.contains("[downloader].binary"));

    let msg = expect_config_error(
        r#"
[downloader]
output_template = "/tmp/%(title)s.%(ext)s"
"#,
    );
    assert!(msg.contains("must be relative"));
}

#[test]
fn test_cancel_grace_must_be_a_positive_duration() {
    let msg = expect_config_error(
        r#"
[downloader]
cancel_grace = "0s"
"#,
    );
    assert!(msg.contains("greater than zero"));

    let msg = expect_config_error(
        r#"
[downloader]
cancel_grace = "5 fortnights"
"#,
    );
    assert!(msg.contains("[downloader].cancel_grace"));
    assert!(msg.contains("unsupported duration unit"));
}

#[test]
fn test_cancel_grace_that_overflows_is_rejected() {
    let msg = expect_config_error(
        r#"
[downloader]
cancel_grace = "6000000000000000h"
"#,
    );
    assert!(msg.contains("[downloader].cancel_grace"));
    assert!(msg.contains("too large"));
}

#[test]
fn test_missing_default_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("playlistdl.toml");

    let cfg = load_or_default(&path, false).unwrap();
    assert_eq!(cfg.downloader.binary, "yt-dlp");

    match load_or_default(&path, true) {
        Err(PlaylistDlError::IoError(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        }
        Err(e) => panic!("Expected IoError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_builder_produces_validated_config() {
    let cfg = ConfigFileBuilder::new()
        .output_dir("downloads")
        .cancel_grace("250ms")
        .selector("worst")
        .build();
    assert_eq!(cfg.cancel_grace(), Some(Duration::from_millis(250)));
    assert_eq!(cfg.format_selection(), FormatSelection::Selector("worst".to_string()));

    let raw = ConfigFileBuilder::new().audio_only("flac").selector("best").raw();
    assert!(ConfigFile::try_from(raw).is_err());
}

#[test]
fn test_demo_config_is_valid() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/playlistdl.toml");
    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.cancel_grace(), Some(Duration::from_secs(10)));
    assert_eq!(
        cfg.format_selection(),
        FormatSelection::AudioOnly {
            audio_format: "mp3".to_string()
        }
    );
}

use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use playlistdl::cli::{CliArgs, LogLevel};
use playlistdl::config::ConfigFile;
use playlistdl::effective_options;
use playlistdl::errors::PlaylistDlError;
use playlistdl::logging::build_filter;
use playlistdl::types::{DownloadOptions, FormatSelection};
use playlistdl_test_utils::builders::ConfigFileBuilder;

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["playlistdl", "https://example.com/playlist?list=abc"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn test_defaults_come_from_config() {
    let cfg = ConfigFileBuilder::new()
        .output_dir("music")
        .audio_only("m4a")
        .build();
    let options = effective_options(&cfg, &args(&[])).unwrap();

    assert_eq!(options.output_dir, PathBuf::from("music"));
    assert_eq!(
        options.format,
        FormatSelection::AudioOnly {
            audio_format: "m4a".to_string()
        }
    );
}

#[test]
fn test_cli_flags_override_config() {
    let cfg = ConfigFile::default();
    let options = effective_options(
        &cfg,
        &args(&["-o", "out", "--audio-only", "--audio-format", "opus"]),
    )
    .unwrap();

    assert_eq!(options.output_dir, PathBuf::from("out"));
    assert_eq!(
        options.format,
        FormatSelection::AudioOnly {
            audio_format: "opus".to_string()
        }
    );
}

#[test]
fn test_format_selector_wins_over_configured_audio_only() {
    let cfg = ConfigFileBuilder::new().audio_only("mp3").build();
    let options = effective_options(&cfg, &args(&["--format", "bestvideo+bestaudio"])).unwrap();
    assert_eq!(
        options.format,
        FormatSelection::Selector("bestvideo+bestaudio".to_string())
    );
}

#[test]
fn test_audio_format_alone_does_not_enable_audio_only() {
    let options =
        effective_options(&ConfigFile::default(), &args(&["--audio-format", "flac"])).unwrap();
    assert_eq!(options, DownloadOptions::default());
}

#[test]
fn test_unsupported_audio_format_flag_is_rejected() {
    match effective_options(
        &ConfigFile::default(),
        &args(&["--audio-only", "--audio-format", "mp5"]),
    ) {
        Err(PlaylistDlError::ConfigError(msg)) => assert!(msg.contains("mp5")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_format_conflicts_with_audio_only_flag() {
    let argv = ["playlistdl", "url", "--audio-only", "--format", "best"];
    assert!(CliArgs::try_parse_from(argv).is_err());
}

#[test]
fn test_selection_defaults_to_all() {
    let parsed = args(&[]);
    assert_eq!(parsed.select, "all");
    assert!(!parsed.list);
    assert!(parsed.config.is_none());
}

#[test]
fn test_log_flag_wins_over_environment() {
    let filter = build_filter(Some(LogLevel::Debug), Some("error")).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

    let parsed = args(&["--log-level", "trace"]);
    let filter = build_filter(parsed.log_level, None).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
}

#[test]
fn test_log_environment_takes_directives() {
    let filter = build_filter(None, Some("playlistdl=trace,warn")).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

    let filter = build_filter(None, Some(" info ")).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
}

#[test]
fn test_log_defaults_to_warn() {
    for env in [None, Some(""), Some("   ")] {
        let filter = build_filter(None, env).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}

#[test]
fn test_malformed_log_environment_is_an_error() {
    let err = build_filter(None, Some("playlistdl=loud")).unwrap_err();
    assert!(format!("{err:#}").contains("PLAYLISTDL_LOG"));
}

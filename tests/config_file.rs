//! Config file and command line layering through the public API

use clap::Parser;
use qrcheckin::app::cli::args::Args;
use qrcheckin::app::cli::config::{load_args, Settings};
use qrcheckin::core::logging::LogFormat;
use qrcheckin::scan::api::ScanMode;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_command_line_overrides_config_file() {
    let file = write_config(
        r#"
        base-url = "https://smnc.site/"
        mode = "attendance"
        timeout-secs = 20
        log-format = "json"
        color = true
        "#,
    );
    let path = file.path().to_string_lossy().to_string();
    let cli = Args::try_parse_from([
        "qrcheckin",
        "--config-file",
        path.as_str(),
        "--mode",
        "link",
        "--no-color",
        "-q",
    ])
    .unwrap();

    let args = load_args(cli).await.unwrap();
    let settings = Settings::resolve(&args, true).unwrap();

    assert_eq!(settings.base_url, "https://smnc.site");
    assert_eq!(settings.mode, ScanMode::Link);
    assert_eq!(settings.timeout, Duration::from_secs(20));
    assert_eq!(settings.log_format, LogFormat::Json);
    assert_eq!(settings.log_level, "warn");
    assert!(!settings.color);
}

#[tokio::test]
async fn test_invalid_config_value_names_the_problem() {
    let file = write_config("timeout-secs = 0\n");
    let cli = Args {
        config_file: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let error = load_args(cli).await.unwrap_err();
    assert!(error.message().contains("timeout-secs"));
}

//! Command line arguments
//!
//! Every value is optional here so that a config file can fill in what the
//! command line leaves out. [`Settings`](super::config::Settings) resolves
//! the final values.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "qrcheckin")]
#[command(about = "Event check-in by QR badge scanning")]
#[command(version)]
#[command(
    after_help = "Each input line is a decoded QR payload. Commands: :ack :rearm :pause :bg :fg :quit"
)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Events backend base URL
    #[arg(short = 'u', long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// How scanned payloads are handled
    #[arg(short = 'm', long = "mode", value_name = "MODE", value_parser = ["attendance", "link"])]
    pub mode: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long = "timeout-secs", value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Bearer token for the events backend
    #[arg(long = "token", value_name = "TOKEN", env = "QRCHECKIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Verbose output (repeat for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet output (repeat for less)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Log level (overrides -v/-q)
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color_flag: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Color setting from the config file
    #[arg(skip)]
    pub color: Option<bool>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net verbosity, positive for `-v`
    pub fn verbosity(&self) -> i8 {
        let verbose = self.verbose.min(i8::MAX as u8) as i8;
        let quiet = self.quiet.min(i8::MAX as u8) as i8;
        verbose - quiet
    }

    /// `--color`/`--no-color` win over the config file; `None` means auto
    pub fn color_preference(&self) -> Option<bool> {
        if self.color_flag {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            self.color
        }
    }

    /// Lay command line values over these (config file) values
    pub fn overlay(&mut self, cli: Args) {
        if cli.config_file.is_some() {
            self.config_file = cli.config_file;
        }
        if cli.base_url.is_some() {
            self.base_url = cli.base_url;
        }
        if cli.mode.is_some() {
            self.mode = cli.mode;
        }
        if cli.timeout_secs.is_some() {
            self.timeout_secs = cli.timeout_secs;
        }
        if cli.token.is_some() {
            self.token = cli.token;
        }
        if cli.log_level.is_some() {
            self.log_level = cli.log_level;
        }
        if cli.log_file.is_some() {
            self.log_file = cli.log_file;
        }
        if cli.log_format.is_some() {
            self.log_format = cli.log_format;
        }
        self.verbose = cli.verbose;
        self.quiet = cli.quiet;
        self.color_flag = cli.color_flag;
        self.no_color = cli.no_color;
    }
}

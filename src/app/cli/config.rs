//! TOML configuration file loading and settings resolution
//!
//! Values are layered: built-in defaults, then the config file, then the
//! command line.

use crate::attendance::api::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::core::logging::{level_from_verbosity, LogFormat};
use crate::core::validation::{
    validate_base_url, validate_positive_int, validate_timeout_secs, ValidationError,
};
use crate::scan::api::ScanMode;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::args::Args;

/// Backend used when neither the config file nor the command line names one
pub const DEFAULT_BASE_URL: &str = "https://smnc.site";

/// Location searched when `--config-file` is not given
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Qrcheckin").join("qrcheckin.toml"))
}

/// Read and parse a config file
///
/// An explicitly named file must exist. A missing default file is not an
/// error.
pub async fn read_config_file(
    config_file: Option<&Path>,
) -> Result<Option<toml::Table>, ValidationError> {
    let path = match config_file {
        Some(path) => {
            if !path.exists() {
                return Err(ValidationError::new(format!(
                    "The specified configuration file does not exist: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    log::debug!("Loading configuration from {}", path.display());
    let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
        ValidationError::new(format!(
            "Error reading configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    let table = toml::from_str::<toml::Table>(&contents).map_err(|e| {
        ValidationError::new(format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(Some(table))
}

/// Config file values with the command line laid over them
pub async fn load_args(cli: Args) -> Result<Args, ValidationError> {
    let mut args = Args::new();
    if let Some(table) = read_config_file(cli.config_file.as_deref()).await? {
        Args::apply_toml_values(&mut args, &table)?;
    }
    args.overlay(cli);
    Ok(args)
}

fn expect_str<'a>(key: &str, value: &'a toml::Value) -> Result<&'a str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| ValidationError::new(format!("Config key '{key}' must be a string")))
}

fn expect_bool(key: &str, value: &toml::Value) -> Result<bool, ValidationError> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::new(format!("Config key '{key}' must be true or false")))
}

fn log_file_value(value: &str) -> Option<PathBuf> {
    // "none" and "-" disable file logging
    if value.eq_ignore_ascii_case("none") || value == "-" {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

impl Args {
    /// Apply TOML configuration values to Args
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ValidationError> {
        for (key, value) in config {
            match key.as_str() {
                "base-url" => args.base_url = Some(expect_str(key, value)?.to_string()),
                "mode" => {
                    let mode = expect_str(key, value)?;
                    ScanMode::from_str(mode).map_err(|_| {
                        ValidationError::new(format!(
                            "Invalid mode '{mode}': expected 'attendance' or 'link'"
                        ))
                    })?;
                    args.mode = Some(mode.to_string());
                }
                "timeout-secs" => {
                    let secs = match value {
                        toml::Value::Integer(n) if *n > 0 => *n as u64,
                        toml::Value::String(s) => validate_positive_int(s)?,
                        _ => {
                            return Err(ValidationError::new(
                                "Config key 'timeout-secs' must be a positive integer",
                            ))
                        }
                    };
                    args.timeout_secs = Some(secs);
                }
                "token" => args.token = Some(expect_str(key, value)?.to_string()),
                "log-level" => args.log_level = Some(expect_str(key, value)?.to_string()),
                "log-format" => args.log_format = Some(expect_str(key, value)?.to_string()),
                "log-file" => args.log_file = log_file_value(expect_str(key, value)?),
                "color" => args.color = Some(expect_bool(key, value)?),
                "no-color" => args.color = Some(!expect_bool(key, value)?),
                other => log::warn!("Ignoring unknown config key '{}'", other),
            }
        }
        Ok(())
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub mode: ScanMode,
    pub timeout: Duration,
    pub token: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub color: bool,
}

impl Settings {
    /// Validate merged arguments and fill in defaults
    ///
    /// `terminal` decides color when neither the config nor the command line
    /// sets it.
    pub fn resolve(args: &Args, terminal: bool) -> Result<Self, ValidationError> {
        let base_url = validate_base_url(args.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let mode = match args.mode.as_deref() {
            Some(mode) => ScanMode::from_str(mode)
                .map_err(|_| ValidationError::new(format!("Invalid mode '{mode}'")))?,
            None => ScanMode::default(),
        };

        let timeout = validate_timeout_secs(args.timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))?;

        let token = args
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let log_level = args
            .log_level
            .clone()
            .unwrap_or_else(|| level_from_verbosity(args.verbosity()).to_string());

        let log_format = match args.log_format.as_deref() {
            Some(format) => LogFormat::from_str(format)
                .map_err(|_| ValidationError::new(format!("Invalid log format '{format}'")))?,
            None => LogFormat::Text,
        };

        let log_file = args
            .log_file
            .as_ref()
            .filter(|p| p.to_str().map_or(true, |s| log_file_value(s).is_some()))
            .cloned();

        Ok(Self {
            base_url,
            mode,
            timeout,
            token,
            log_level,
            log_format,
            log_file,
            color: args.color_preference().unwrap_or(terminal),
        })
    }
}

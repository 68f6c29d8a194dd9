//! Validation of configuration values
//!
//! Used by the CLI and config-file layers before a session is built.

use crate::core::error_handling::ContextualError;
use reqwest::Url;
use std::time::Duration;

/// A configuration value that failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate and normalise the backend base URL
///
/// Only http and https URLs with a host are accepted. Trailing slashes are
/// removed so paths can be appended directly.
pub fn validate_base_url(url: &str) -> Result<String, ValidationError> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| ValidationError::new(format!("Invalid base URL '{trimmed}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::new(format!(
            "Invalid base URL '{trimmed}': only http:// and https:// are supported"
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::new(format!(
            "Invalid base URL '{trimmed}': missing host"
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Validate a timeout given in whole seconds
pub fn validate_timeout_secs(secs: u64) -> Result<Duration, ValidationError> {
    if secs == 0 {
        return Err(ValidationError::new("Timeout must be greater than 0 seconds"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a positive integer from text (used for TOML string values)
pub fn validate_positive_int(value: &str) -> Result<u64, ValidationError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ValidationError::new("Value must be greater than 0")),
        Ok(n) => Ok(n),
        Err(_) => Err(ValidationError::new(format!(
            "'{value}' is not a valid positive integer"
        ))),
    }
}

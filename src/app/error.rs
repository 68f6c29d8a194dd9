//! Application-level errors

use crate::attendance::api::AttendanceError;
use crate::core::error_handling::ContextualError;
use crate::core::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error("Backend setup failed: {0}")]
    Backend(#[from] AttendanceError),

    #[error("Logging setup failed: {message}")]
    Logging { message: String },

    #[error("Console input failed: {0}")]
    Input(#[from] std::io::Error),

    #[error("Scan session task failed: {message}")]
    Session { message: String },
}

impl ContextualError for AppError {
    fn is_user_actionable(&self) -> bool {
        match self {
            AppError::Config(e) => e.is_user_actionable(),
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            AppError::Config(e) => e.user_message(),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

//! Attendance submission errors

use crate::core::error_handling::ContextualError;

/// Why a submission did not record attendance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttendanceError {
    /// The backend could not be reached or the response could not be read
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The backend answered but did not record the attendance
    #[error("Rejected by backend (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// The backend does not handle this kind of submission
    #[error("{handler} cannot handle {submission}")]
    Unsupported {
        handler: &'static str,
        submission: String,
    },
}

impl ContextualError for AttendanceError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, AttendanceError::Rejected { message: Some(_), .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            AttendanceError::Rejected {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;

//! User-facing notices raised by a scan session

use crate::attendance::error::AttendanceError;
use crate::attendance::traits::Receipt;
use crate::scan::payload::InvalidPayload;

/// Kind of notice shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum NoticeKind {
    Success,
    Failure,
    InvalidPayload,
}

/// A notice for the user notification surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: Option<String>,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, message: Option<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message,
        }
    }

    /// Success notice, preferring the backend's own wording
    pub fn success(receipt: &Receipt) -> Self {
        Self::new(
            NoticeKind::Success,
            "Success",
            Some(
                receipt
                    .message
                    .clone()
                    .unwrap_or_else(|| "Attendance updated successfully.".to_string()),
            ),
        )
    }

    /// Failure notice for a submission error
    ///
    /// A backend rejection keeps the backend's own message when it sent one.
    pub fn failure(error: &AttendanceError) -> Self {
        match error {
            AttendanceError::Rejected { message, .. } => Self::new(
                NoticeKind::Failure,
                "Failure",
                Some(
                    message
                        .clone()
                        .unwrap_or_else(|| "Failed to update attendance.".to_string()),
                ),
            ),
            AttendanceError::Transport { .. } | AttendanceError::Unsupported { .. } => Self::new(
                NoticeKind::Failure,
                "Error",
                Some("An error occurred while updating attendance.".to_string()),
            ),
        }
    }

    pub fn invalid_payload(reason: &InvalidPayload) -> Self {
        log::trace!("Invalid payload notice: {}", reason);
        Self::new(
            NoticeKind::InvalidPayload,
            "Invalid QR Code",
            Some("The scanned QR code does not contain valid ID and Student ID.".to_string()),
        )
    }
}

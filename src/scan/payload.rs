//! Decoded payload parsing
//!
//! A decoded QR payload is untrusted text. It becomes a [`Submission`] only
//! after the token count and emptiness checks pass.

use serde::Deserialize;

/// Delimiter between the event id and the student id on a badge
pub const BADGE_DELIMITER: char = '/';

/// How payloads are interpreted
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Deserialize,
    strum_macros::EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ScanMode {
    /// `eventId/studentId` badges submitted to the attendance endpoint
    #[default]
    Attendance,
    /// Any payload is a link handed to the host to open
    Link,
}

/// A payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Attendance { event_id: String, student_id: String },
    OpenLink { url: String },
}

impl Submission {
    pub fn attendance(event_id: impl Into<String>, student_id: impl Into<String>) -> Self {
        Submission::Attendance {
            event_id: event_id.into(),
            student_id: student_id.into(),
        }
    }

    /// Short form for log lines
    pub fn describe(&self) -> String {
        match self {
            Submission::Attendance {
                event_id,
                student_id,
            } => format!("event={event_id} student={student_id}"),
            Submission::OpenLink { url } => format!("link={url}"),
        }
    }
}

/// Why a payload was rejected before any network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPayload {
    #[error("payload is empty")]
    Empty,
    #[error("payload has no '/' delimiter")]
    MissingDelimiter,
    #[error("event id is empty")]
    EmptyEventId,
    #[error("student id is empty")]
    EmptyStudentId,
}

/// Tagged parse result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPayload {
    Valid(Submission),
    Invalid(InvalidPayload),
}

/// Parse a decoded payload for the given mode
///
/// In attendance mode the first two `/`-separated tokens are the event id
/// and the student id, taken exactly as scanned; only empty tokens are
/// rejected. Tokens past the second are ignored. A blank payload is
/// invalid in either mode.
pub fn parse_payload(raw: &str, mode: ScanMode) -> ParsedPayload {
    if raw.trim().is_empty() {
        return ParsedPayload::Invalid(InvalidPayload::Empty);
    }

    match mode {
        ScanMode::Link => ParsedPayload::Valid(Submission::OpenLink {
            url: raw.to_string(),
        }),
        ScanMode::Attendance => {
            let mut tokens = raw.split(BADGE_DELIMITER);
            let event_id = tokens.next().unwrap_or_default();
            let Some(student_id) = tokens.next() else {
                return ParsedPayload::Invalid(InvalidPayload::MissingDelimiter);
            };
            if event_id.is_empty() {
                return ParsedPayload::Invalid(InvalidPayload::EmptyEventId);
            }
            if student_id.is_empty() {
                return ParsedPayload::Invalid(InvalidPayload::EmptyStudentId);
            }
            ParsedPayload::Valid(Submission::attendance(event_id, student_id))
        }
    }
}

/// Error building badge text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BadgeError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must not contain '/'")]
    ContainsDelimiter { field: &'static str },
}

/// Build the text encoded into a student's attendance badge
///
/// The result parses back to the same pair under [`ScanMode::Attendance`].
pub fn encode_badge(event_id: &str, student_id: &str) -> Result<String, BadgeError> {
    for (field, value) in [("event id", event_id), ("student id", student_id)] {
        if value.trim().is_empty() {
            return Err(BadgeError::EmptyField { field });
        }
        if value.contains(BADGE_DELIMITER) {
            return Err(BadgeError::ContainsDelimiter { field });
        }
    }
    Ok(format!("{event_id}{BADGE_DELIMITER}{student_id}"))
}

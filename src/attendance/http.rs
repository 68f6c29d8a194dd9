//! HTTP attendance backend

use crate::attendance::error::{AttendanceError, AttendanceResult};
use crate::attendance::traits::{AttendanceApi, Receipt};
use crate::scan::payload::Submission;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Path of the attendance update endpoint, relative to the base URL
pub const UPDATE_ATTENDANCE_PATH: &str = "/api/Events/UpdateAttendance";

/// Default transport timeout for one attendance request
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`HttpAttendanceApi`]
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    /// Scheme and host, without a trailing slash
    pub base_url: String,
    pub timeout: Duration,
    /// Sent as a bearer token when present
    pub token: Option<String>,
}

impl HttpApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            token: None,
        }
    }
}

// Response envelope used across the backend: { status, message, data }
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

/// Submits `(id, studentId)` pairs to the events backend
pub struct HttpAttendanceApi {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpAttendanceApi {
    pub fn new(config: &HttpApiConfig) -> AttendanceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AttendanceError::Transport {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                UPDATE_ATTENDANCE_PATH
            ),
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn submit(&self, submission: &Submission) -> AttendanceResult<Receipt> {
        let Submission::Attendance {
            event_id,
            student_id,
        } = submission
        else {
            return Err(AttendanceError::Unsupported {
                handler: self.name(),
                submission: submission.describe(),
            });
        };

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("id", event_id.as_str()), ("studentId", student_id.as_str())])
            .header(reqwest::header::ACCEPT, "*/*");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        log::debug!("GET {} ({})", self.endpoint, submission.describe());
        let response = request
            .send()
            .await
            .map_err(|e| AttendanceError::Transport {
                message: format!("Network request failed: {e}"),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttendanceError::Transport {
                message: format!("Failed to read response body: {e}"),
            })?;

        interpret_response(status.as_u16(), &body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Classify a backend answer
///
/// Any 2xx records attendance unless the JSON envelope says `"status": false`.
/// The envelope's `message`, when present, is carried either way.
fn interpret_response(status: u16, body: &str) -> AttendanceResult<Receipt> {
    let envelope = serde_json::from_str::<ApiEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .and_then(|e| e.message.as_deref())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    let success = (200..300).contains(&status);
    let envelope_rejected = envelope.as_ref().and_then(|e| e.status) == Some(false);

    if success && !envelope_rejected {
        Ok(Receipt { message })
    } else {
        log::warn!(
            "Attendance rejected: HTTP {} {}",
            status,
            message.as_deref().unwrap_or("")
        );
        Err(AttendanceError::Rejected { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_envelope() {
        let receipt =
            interpret_response(200, r#"{"status":true,"message":"Updated","data":null}"#).unwrap();
        assert_eq!(receipt.message.as_deref(), Some("Updated"));
    }

    #[test]
    fn test_success_with_plain_body() {
        let receipt = interpret_response(204, "").unwrap();
        assert_eq!(receipt, Receipt::default());
    }

    #[test]
    fn test_non_success_status_is_rejected() {
        let err = interpret_response(400, r#"{"status":false,"message":"Not registered"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            AttendanceError::Rejected {
                status: 400,
                message: Some("Not registered".to_string())
            }
        );
    }

    #[test]
    fn test_envelope_false_on_ok_is_rejected() {
        let err = interpret_response(200, r#"{"status":false,"message":"Already checked in"}"#)
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Rejected { status: 200, .. }));
    }

    #[test]
    fn test_blank_message_is_dropped() {
        let err = interpret_response(500, r#"{"message":"   "}"#).unwrap_err();
        assert_eq!(
            err,
            AttendanceError::Rejected {
                status: 500,
                message: None
            }
        );
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let api = HttpAttendanceApi::new(&HttpApiConfig::new("https://smnc.site/")).unwrap();
        assert_eq!(
            api.endpoint(),
            "https://smnc.site/api/Events/UpdateAttendance"
        );
    }

    #[tokio::test]
    async fn test_link_submission_is_unsupported() {
        let api = HttpAttendanceApi::new(&HttpApiConfig::new("http://127.0.0.1:9")).unwrap();
        let err = api
            .submit(&Submission::OpenLink {
                url: "https://example.org".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Unsupported { handler: "http", .. }));
    }
}

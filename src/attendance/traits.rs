//! The attendance submission seam

use crate::attendance::error::AttendanceResult;
use crate::scan::payload::Submission;
use async_trait::async_trait;

/// Acknowledgement from a backend that a submission was recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Backend-provided text, if any
    pub message: Option<String>,
}

/// Records one validated submission
///
/// Implementations make at most one attempt per call. Retrying is the
/// user's decision, made by presenting the badge again.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn submit(&self, submission: &Submission) -> AttendanceResult<Receipt>;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

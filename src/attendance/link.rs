//! Pass-through backend that opens scanned links

use crate::attendance::error::{AttendanceError, AttendanceResult};
use crate::attendance::traits::{AttendanceApi, Receipt};
use crate::scan::payload::Submission;
use async_trait::async_trait;

type LinkSink = Box<dyn Fn(&str) + Send + Sync>;

/// Hands each scanned link to the host and always succeeds
pub struct LinkLauncher {
    sink: LinkSink,
}

impl LinkLauncher {
    pub fn new(sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }
}

#[async_trait]
impl AttendanceApi for LinkLauncher {
    async fn submit(&self, submission: &Submission) -> AttendanceResult<Receipt> {
        match submission {
            Submission::OpenLink { url } => {
                log::info!("Opening scanned link {}", url);
                (self.sink)(url);
                Ok(Receipt {
                    message: Some(format!("Opened {url}")),
                })
            }
            other => Err(AttendanceError::Unsupported {
                handler: self.name(),
                submission: other.describe(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "link"
    }
}

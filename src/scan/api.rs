//! Public API for scan sessions

pub use crate::scan::controller::{
    Effect, ScanController, ScanStatistics, SubmissionTicket, Transition,
};
pub use crate::scan::notice::{Notice, NoticeKind};
pub use crate::scan::payload::{
    encode_badge, parse_payload, BadgeError, InvalidPayload, ParsedPayload, ScanMode, Submission,
    BADGE_DELIMITER,
};
pub use crate::scan::session::{ScanSession, SessionCommand, SessionConfig, SessionInput};
pub use crate::scan::state::{Generation, LifecyclePhase, Pending, ScanState};

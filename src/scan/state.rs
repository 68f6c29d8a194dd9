//! Scan session state types

use crate::scan::notice::NoticeKind;
use std::fmt;

/// Tag for one armed cycle of a session
///
/// Bumped every time the session (re-)enters [`ScanState::Armed`]. A
/// submission carries the generation it was accepted under; a result whose
/// generation no longer matches is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub const FIRST: Generation = Generation(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host application visibility
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumString, strum_macros::Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LifecyclePhase {
    Foreground,
    Background,
}

/// What a locked session is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// The attendance request is in flight
    Submitting,
    /// The result was shown; waiting for the user to dismiss it
    AwaitingAck(NoticeKind),
}

/// The single owned state of a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Decoder output is accepted
    Armed,
    /// One payload was accepted under `generation`; decoder output is dropped
    Locked {
        generation: Generation,
        pending: Pending,
    },
    /// Paused by the user; decoder output is dropped
    Idle,
}

impl ScanState {
    pub fn is_armed(&self) -> bool {
        matches!(self, ScanState::Armed)
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, ScanState::Locked { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScanState::Armed => "armed",
            ScanState::Locked {
                pending: Pending::Submitting,
                ..
            } => "locked(submitting)",
            ScanState::Locked {
                pending: Pending::AwaitingAck(_),
                ..
            } => "locked(awaiting-ack)",
            ScanState::Idle => "idle",
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_generation_ordering() {
        let first = Generation::FIRST;
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 2);
        assert_eq!(second.to_string(), "#2");
    }

    #[test]
    fn test_lifecycle_phase_parsing() {
        assert_eq!(
            LifecyclePhase::from_str("Background").unwrap(),
            LifecyclePhase::Background
        );
        assert_eq!(
            LifecyclePhase::from_str("foreground").unwrap(),
            LifecyclePhase::Foreground
        );
        assert!(LifecyclePhase::from_str("inactive").is_err());
        assert_eq!(LifecyclePhase::Background.to_string(), "background");
    }

    #[test]
    fn test_state_names() {
        let locked = ScanState::Locked {
            generation: Generation::FIRST,
            pending: Pending::Submitting,
        };
        assert_eq!(ScanState::Armed.name(), "armed");
        assert_eq!(locked.to_string(), "locked(submitting)");
        assert!(locked.is_locked());
        assert!(!locked.is_armed());
        assert!(!ScanState::Idle.is_armed());
    }
}

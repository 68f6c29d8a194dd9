//! Scan session state machine
//!
//! `ScanController` owns the one [`ScanState`] of a session and is the only
//! place it changes. It performs no I/O. Each operation returns a
//! [`Transition`] whose [`Effect`] tells the driver what to do next.
//!
//! ```text
//!            payload (valid)                 resolved            ack / rearm
//!   Armed ───────────────────▶ Locked(Submitting) ──▶ Locked(AwaitingAck) ──▶ Armed
//!     │  ▲  payload (invalid): notify, re-arm at once
//!     │  └──────────────────────────────────────────────
//!     │ pause                  rearm / foreground
//!     └──────▶ Idle ─────────────────────────────────▶ Armed
//! ```

use crate::attendance::error::AttendanceResult;
use crate::attendance::traits::Receipt;
use crate::scan::notice::Notice;
use crate::scan::payload::{parse_payload, ParsedPayload, ScanMode, Submission};
use crate::scan::state::{Generation, LifecyclePhase, Pending, ScanState};

/// A submission the driver must send, tagged with its generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub generation: Generation,
    pub submission: Submission,
}

/// Work requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to do
    None,
    /// Call the attendance backend
    Submit(SubmissionTicket),
    /// Show a notice to the user
    Notify(Notice),
    /// Decoder output arrived while not armed and was thrown away
    Dropped,
    /// A submission result for an old generation was thrown away
    Discarded,
}

/// Result of one controller operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ScanState,
    pub to: ScanState,
    pub effect: Effect,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Per-session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    /// Payloads taken while armed
    pub accepted: u64,
    /// Payloads dropped because the session was not armed
    pub dropped: u64,
    /// Accepted payloads that failed to parse
    pub invalid: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Results discarded for a stale generation
    pub stale: u64,
}

pub struct ScanController {
    state: ScanState,
    generation: Generation,
    phase: LifecyclePhase,
    mode: ScanMode,
    stats: ScanStatistics,
}

impl ScanController {
    /// New session, armed under the first generation, in the foreground
    pub fn new(mode: ScanMode) -> Self {
        Self {
            state: ScanState::Armed,
            generation: Generation::FIRST,
            phase: LifecyclePhase::Foreground,
            mode,
            stats: ScanStatistics::default(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn lifecycle_phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn statistics(&self) -> ScanStatistics {
        self.stats
    }

    /// Handle one decoded payload from the decoder
    ///
    /// Only an armed session takes the payload. Anything else is dropped
    /// on the spot and never revisited.
    pub fn on_payload_decoded(&mut self, payload: &str) -> Transition {
        let from = self.state;
        if !from.is_armed() {
            self.stats.dropped += 1;
            log::trace!("Dropped payload while {}", from);
            return self.transition(from, Effect::Dropped);
        }

        self.stats.accepted += 1;
        let generation = self.generation;
        self.state = ScanState::Locked {
            generation,
            pending: Pending::Submitting,
        };

        match parse_payload(payload, self.mode) {
            ParsedPayload::Valid(submission) => {
                log::info!("Submitting {} under {}", submission.describe(), generation);
                self.transition(
                    from,
                    Effect::Submit(SubmissionTicket {
                        generation,
                        submission,
                    }),
                )
            }
            ParsedPayload::Invalid(reason) => {
                self.stats.invalid += 1;
                log::warn!("Rejected scanned code: {}", reason);
                self.arm();
                self.transition(from, Effect::Notify(Notice::invalid_payload(&reason)))
            }
        }
    }

    /// Handle the result of a submission made under `generation`
    ///
    /// Results for any generation other than the one currently locked are
    /// stale: no notice, no state change.
    pub fn on_submission_resolved(
        &mut self,
        generation: Generation,
        result: &AttendanceResult<Receipt>,
    ) -> Transition {
        let from = self.state;
        let current = matches!(
            from,
            ScanState::Locked { generation: locked, pending: Pending::Submitting } if locked == generation
        );
        if !current {
            self.stats.stale += 1;
            log::debug!(
                "Discarded result for {} (current {}, state {})",
                generation,
                self.generation,
                from
            );
            return self.transition(from, Effect::Discarded);
        }

        let notice = match result {
            Ok(receipt) => {
                self.stats.succeeded += 1;
                Notice::success(receipt)
            }
            Err(error) => {
                self.stats.failed += 1;
                log::warn!("Submission {} failed: {}", generation, error);
                Notice::failure(error)
            }
        };
        self.state = ScanState::Locked {
            generation,
            pending: Pending::AwaitingAck(notice.kind),
        };
        self.transition(from, Effect::Notify(notice))
    }

    /// The user dismissed the result notice
    pub fn acknowledge(&mut self) -> Transition {
        let from = self.state;
        if let ScanState::Locked {
            pending: Pending::AwaitingAck(_),
            ..
        } = from
        {
            self.arm();
        }
        self.transition(from, Effect::None)
    }

    /// Track a host foreground/background change
    ///
    /// Coming back to the foreground always re-arms under a new generation,
    /// abandoning whatever was in flight.
    pub fn on_app_lifecycle_change(&mut self, phase: LifecyclePhase) -> Transition {
        let from = self.state;
        let previous = std::mem::replace(&mut self.phase, phase);
        if previous == LifecyclePhase::Background && phase == LifecyclePhase::Foreground {
            log::debug!("Back in foreground; re-arming from {}", from);
            self.arm();
        }
        self.transition(from, Effect::None)
    }

    /// Explicit "scan again"
    pub fn rearm(&mut self) -> Transition {
        let from = self.state;
        if !from.is_armed() {
            self.arm();
        }
        self.transition(from, Effect::None)
    }

    /// Stop accepting payloads until [`rearm`](Self::rearm)
    ///
    /// Pausing a locked session abandons its submission.
    pub fn pause(&mut self) -> Transition {
        let from = self.state;
        match from {
            ScanState::Idle => {}
            ScanState::Armed => self.state = ScanState::Idle,
            ScanState::Locked { .. } => {
                self.generation = self.generation.next();
                self.state = ScanState::Idle;
            }
        }
        self.transition(from, Effect::None)
    }

    fn arm(&mut self) {
        self.generation = self.generation.next();
        self.state = ScanState::Armed;
    }

    fn transition(&self, from: ScanState, effect: Effect) -> Transition {
        if from != self.state {
            log::debug!("{} -> {} ({})", from, self.state, self.generation);
        }
        Transition {
            from,
            to: self.state,
            effect,
        }
    }
}

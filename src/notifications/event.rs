//! Event types for the notification system

use std::time::SystemTime;

use crate::scan::notice::Notice;
use crate::scan::state::{Generation, LifecyclePhase};

/// Host application moved between foreground and background
#[derive(Clone, Debug)]
pub struct LifecycleEvent {
    pub phase: LifecyclePhase,
    pub timestamp: SystemTime,
}

impl LifecycleEvent {
    pub fn new(phase: LifecyclePhase) -> Self {
        Self {
            phase,
            timestamp: SystemTime::now(),
        }
    }
}

/// A notice a scan session wants shown to the user
#[derive(Clone, Debug)]
pub struct NoticeEvent {
    pub session_id: String,
    pub notice: Notice,
    pub timestamp: SystemTime,
}

impl NoticeEvent {
    pub fn new(session_id: String, notice: Notice) -> Self {
        Self {
            session_id,
            notice,
            timestamp: SystemTime::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEventType {
    Opened,
    Armed,
    Locked,
    Idle,
    Closed,
}

/// Scan session state changes, for observers and logs
#[derive(Clone, Debug)]
pub struct SessionEvent {
    pub event_type: SessionEventType,
    pub session_id: String,
    pub generation: Generation,
    pub timestamp: SystemTime,
    pub message: Option<String>,
}

impl SessionEvent {
    pub fn new(event_type: SessionEventType, session_id: String, generation: Generation) -> Self {
        Self {
            event_type,
            session_id,
            generation,
            timestamp: SystemTime::now(),
            message: None,
        }
    }

    pub fn with_message(
        event_type: SessionEventType,
        session_id: String,
        generation: Generation,
        message: String,
    ) -> Self {
        Self {
            message: Some(message),
            ..Self::new(event_type, session_id, generation)
        }
    }
}

/// Unified event enum that encompasses all event types
#[derive(Clone, Debug)]
pub enum Event {
    Lifecycle(LifecycleEvent),
    Notice(NoticeEvent),
    Session(SessionEvent),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Lifecycle(_) => "Lifecycle",
            Event::Notice(_) => "Notice",
            Event::Session(_) => "Session",
        }
    }
}

/// Event filtering options for subscribers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventFilter {
    LifecycleOnly,
    NoticeOnly,
    SessionOnly,
    NoticeAndSession,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (EventFilter::LifecycleOnly, Event::Lifecycle(_))
                | (EventFilter::NoticeOnly, Event::Notice(_))
                | (EventFilter::SessionOnly, Event::Session(_))
                | (EventFilter::NoticeAndSession, Event::Notice(_))
                | (EventFilter::NoticeAndSession, Event::Session(_))
                | (EventFilter::All, _)
        )
    }
}

//! Async driver for one scan session
//!
//! `ScanSession` runs a single select loop around a [`ScanController`]. It
//! is the only owner of the controller, so every transition happens on one
//! logical thread; submissions run as spawned tasks that report back over a
//! channel tagged with their generation.

use crate::attendance::error::AttendanceResult;
use crate::attendance::traits::{AttendanceApi, Receipt};
use crate::notifications::api::{
    publish_event, Event, EventFilter, NoticeEvent, NotificationService, SessionEvent,
    SessionEventType, Subscription,
};
use crate::scan::controller::{Effect, ScanController, ScanStatistics, SubmissionTicket, Transition};
use crate::scan::payload::ScanMode;
use crate::scan::state::{Generation, LifecyclePhase, ScanState};
use futures::{Stream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// User actions delivered to a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Dismiss the current result notice
    Acknowledge,
    /// "Scan again"
    Rearm,
    /// Stop scanning until rearmed
    Pause,
}

/// One ordered input to a running session
///
/// Payloads, commands and lifecycle changes from the same host share a
/// stream so the session sees them in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Payload(String),
    Command(SessionCommand),
    Lifecycle(LifecyclePhase),
}

impl From<SessionCommand> for SessionInput {
    fn from(command: SessionCommand) -> Self {
        SessionInput::Command(command)
    }
}

impl From<LifecyclePhase> for SessionInput {
    fn from(phase: LifecyclePhase) -> Self {
        SessionInput::Lifecycle(phase)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_id: String,
    pub mode: ScanMode,
}

impl SessionConfig {
    pub fn new(session_id: impl Into<String>, mode: ScanMode) -> Self {
        Self {
            session_id: session_id.into(),
            mode,
        }
    }
}

type Completion = (Generation, AttendanceResult<Receipt>);

pub struct ScanSession {
    id: String,
    controller: ScanController,
    api: Arc<dyn AttendanceApi>,
    notifications: NotificationService,
    lifecycle: Subscription,
    armed_tx: watch::Sender<bool>,
    announced: Generation,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl ScanSession {
    /// Create an armed session and subscribe it to lifecycle events
    pub async fn open(
        config: SessionConfig,
        api: Arc<dyn AttendanceApi>,
        notifications: NotificationService,
    ) -> Self {
        let lifecycle = Subscription::open(
            &notifications,
            format!("{}:lifecycle", config.session_id),
            EventFilter::LifecycleOnly,
            format!("scan:session:{}", config.session_id),
        )
        .await;
        let controller = ScanController::new(config.mode);
        let (armed_tx, _) = watch::channel(controller.state().is_armed());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        log::info!(
            "Scan session '{}' opened in {} mode with {} backend",
            config.session_id,
            config.mode,
            api.name()
        );

        Self {
            id: config.session_id,
            controller,
            api,
            notifications,
            lifecycle,
            armed_tx,
            announced: Generation::FIRST,
            completions_tx,
            completions_rx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ScanState {
        self.controller.state()
    }

    /// `true` exactly while decoder output is accepted
    ///
    /// Hosts use this to switch the camera decoder on and off.
    pub fn armed_signal(&self) -> watch::Receiver<bool> {
        self.armed_tx.subscribe()
    }

    /// Drive the session until `inputs` ends or `shutdown` completes
    ///
    /// Lifecycle events published on the notification bus are handled too;
    /// they are not ordered relative to `inputs`.
    pub async fn run<I, S>(mut self, inputs: I, shutdown: S) -> ScanStatistics
    where
        I: Stream<Item = SessionInput> + Unpin,
        S: Future<Output = ()>,
    {
        let mut inputs = inputs;
        tokio::pin!(shutdown);

        self.publish_session(SessionEventType::Opened, None).await;

        let reason = loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break "shutdown requested",

                event = self.lifecycle.recv() => match event {
                    Some(Event::Lifecycle(lifecycle)) => self.handle_lifecycle(lifecycle.phase).await,
                    Some(other) => log::trace!("Ignoring {} event", other.kind()),
                    None => break "lifecycle subscription closed",
                },

                Some((generation, result)) = self.completions_rx.recv() => {
                    let transition = self.controller.on_submission_resolved(generation, &result);
                    self.apply(transition).await;
                }

                input = inputs.next() => match input {
                    Some(SessionInput::Payload(payload)) => {
                        let transition = self.controller.on_payload_decoded(&payload);
                        self.apply(transition).await;
                    }
                    Some(SessionInput::Command(command)) => self.handle_command(command).await,
                    Some(SessionInput::Lifecycle(phase)) => self.handle_lifecycle(phase).await,
                    None => break "input stream ended",
                },
            }
        };

        self.close(reason).await
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        log::debug!("Session '{}' command {:?}", self.id, command);
        let transition = match command {
            SessionCommand::Acknowledge => self.controller.acknowledge(),
            SessionCommand::Rearm => self.controller.rearm(),
            SessionCommand::Pause => self.controller.pause(),
        };
        self.apply(transition).await;
    }

    async fn handle_lifecycle(&mut self, phase: LifecyclePhase) {
        let transition = self.controller.on_app_lifecycle_change(phase);
        self.apply(transition).await;
    }

    async fn apply(&mut self, transition: Transition) {
        match transition.effect.clone() {
            Effect::Submit(ticket) => self.spawn_submission(ticket),
            Effect::Notify(notice) => {
                publish_event(
                    &self.notifications,
                    Event::Notice(NoticeEvent::new(self.id.clone(), notice)),
                )
                .await;
            }
            Effect::None | Effect::Dropped | Effect::Discarded => {}
        }

        // A re-arm can keep the state name but always opens a new generation
        let generation = self.controller.generation();
        if transition.changed() || generation != self.announced {
            self.announced = generation;
            self.armed_tx.send_replace(transition.to.is_armed());
            let event_type = match transition.to {
                ScanState::Armed => SessionEventType::Armed,
                ScanState::Locked { .. } => SessionEventType::Locked,
                ScanState::Idle => SessionEventType::Idle,
            };
            self.publish_session(event_type, None).await;
        }
    }

    fn spawn_submission(&self, ticket: SubmissionTicket) {
        let api = self.api.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = api.submit(&ticket.submission).await;
            // The session may be gone; its result is moot then
            let _ = completions.send((ticket.generation, result));
        });
    }

    async fn publish_session(&self, event_type: SessionEventType, message: Option<String>) {
        let generation = self.controller.generation();
        let event = match message {
            Some(message) => SessionEvent::with_message(event_type, self.id.clone(), generation, message),
            None => SessionEvent::new(event_type, self.id.clone(), generation),
        };
        publish_event(&self.notifications, Event::Session(event)).await;
    }

    async fn close(mut self, reason: &str) -> ScanStatistics {
        let stats = self.controller.statistics();
        log::info!(
            "Scan session '{}' closed ({}): accepted={} dropped={} invalid={} succeeded={} failed={} stale={}",
            self.id,
            reason,
            stats.accepted,
            stats.dropped,
            stats.invalid,
            stats.succeeded,
            stats.failed,
            stats.stale
        );
        self.armed_tx.send_replace(false);
        self.publish_session(SessionEventType::Closed, Some(reason.to_string()))
            .await;
        self.completions_rx.close();
        self.lifecycle.dispose().await;
        stats
    }
}

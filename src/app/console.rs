//! Line-oriented console host for a scan session
//!
//! Each input line is either a decoded payload or a `:command`. Notices and
//! session state changes are printed as they arrive on the notification bus.

use crate::app::error::{AppError, AppResult};
use crate::core::styles::StyleRole;
use crate::notifications::api::{
    Event, EventFilter, NotificationService, SessionEvent, SessionEventType, Subscription,
};
use crate::scan::api::{
    LifecyclePhase, Notice, NoticeKind, ScanSession, ScanStatistics, SessionCommand, SessionInput,
};
use futures::channel::mpsc as input_channel;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Payload(String),
    Session(SessionCommand),
    Lifecycle(LifecyclePhase),
    Quit,
    Unknown(String),
}

/// Parse a console line; blank lines yield `None`
///
/// Payload lines are passed on exactly as typed.
pub fn parse_line(line: &str) -> Option<ConsoleInput> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Some(ConsoleInput::Payload(line.to_string()));
    };

    Some(match command.to_ascii_lowercase().as_str() {
        "ack" | "a" | "ok" => ConsoleInput::Session(SessionCommand::Acknowledge),
        "rearm" | "r" | "again" => ConsoleInput::Session(SessionCommand::Rearm),
        "pause" | "p" => ConsoleInput::Session(SessionCommand::Pause),
        "bg" | "background" => ConsoleInput::Lifecycle(LifecyclePhase::Background),
        "fg" | "foreground" => ConsoleInput::Lifecycle(LifecyclePhase::Foreground),
        "quit" | "q" | "exit" => ConsoleInput::Quit,
        _ => ConsoleInput::Unknown(command.to_string()),
    })
}

pub fn format_notice(notice: &Notice, color: bool) -> String {
    let role = match notice.kind {
        NoticeKind::Success => StyleRole::Success,
        NoticeKind::Failure => StyleRole::Failure,
        NoticeKind::InvalidPayload => StyleRole::Warning,
    };
    let mut line = role.paint(&notice.title, color);
    if let Some(message) = &notice.message {
        line.push_str(": ");
        line.push_str(message);
    }
    // Invalid codes re-arm on their own; results wait for the user
    if notice.kind != NoticeKind::InvalidPayload {
        line.push(' ');
        line.push_str(&StyleRole::Dim.paint("(:ack to continue)", color));
    }
    line
}

/// Status line for a session event, if it is worth showing
pub fn format_session_event(event: &SessionEvent, color: bool) -> Option<String> {
    match event.event_type {
        SessionEventType::Opened | SessionEventType::Armed => {
            Some(StyleRole::Prompt.paint("Ready to scan", color))
        }
        SessionEventType::Idle => Some(StyleRole::Dim.paint("Paused (:rearm to resume)", color)),
        SessionEventType::Locked | SessionEventType::Closed => None,
    }
}

pub struct Console {
    service: NotificationService,
    color: bool,
}

impl Console {
    pub fn new(service: NotificationService, color: bool) -> Self {
        Self { service, color }
    }

    /// Feed `input` into `session` until end of input, `:quit`, or shutdown
    pub async fn run<R, W>(
        &self,
        session: ScanSession,
        input: R,
        output: W,
        mut shutdown: broadcast::Receiver<()>,
    ) -> AppResult<ScanStatistics>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let session_id = session.id().to_string();
        let updates = Subscription::open(
            &self.service,
            format!("{session_id}:console"),
            EventFilter::NoticeAndSession,
            "app:console",
        )
        .await;
        let printer = tokio::spawn(print_updates(updates, output, session_id, self.color));

        // One channel keeps payloads and commands in typing order
        let (inputs_tx, inputs_rx) = input_channel::unbounded();
        let mut session_task = tokio::spawn(session.run(inputs_rx, async move {
            let _ = shutdown.recv().await;
        }));

        let mut lines = input.lines();
        let finished = loop {
            tokio::select! {
                finished = &mut session_task => break Some(finished),
                line = lines.next_line() => {
                    let Some(line) = line? else { break None };
                    let input = match parse_line(&line) {
                        None => continue,
                        Some(ConsoleInput::Payload(payload)) => SessionInput::Payload(payload),
                        Some(ConsoleInput::Session(command)) => SessionInput::Command(command),
                        Some(ConsoleInput::Lifecycle(phase)) => SessionInput::Lifecycle(phase),
                        Some(ConsoleInput::Quit) => break None,
                        Some(ConsoleInput::Unknown(command)) => {
                            log::warn!("Unknown command ':{}'", command);
                            continue;
                        }
                    };
                    if inputs_tx.unbounded_send(input).is_err() {
                        break None;
                    }
                }
            }
        };

        // Closing the input ends the session after it drains what is queued
        drop(inputs_tx);
        let finished = match finished {
            Some(finished) => finished,
            None => session_task.await,
        };
        let statistics = finished.map_err(|e| AppError::Session {
            message: e.to_string(),
        })?;

        if let Err(e) = printer.await {
            log::debug!("Console printer ended abnormally: {}", e);
        }
        Ok(statistics)
    }
}

async fn print_updates<W>(mut updates: Subscription, mut output: W, session_id: String, color: bool)
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = updates.recv().await {
        let line = match &event {
            Event::Notice(notice) => Some(format_notice(&notice.notice, color)),
            Event::Session(session) if session.session_id == session_id => {
                if session.event_type == SessionEventType::Closed {
                    break;
                }
                format_session_event(session, color)
            }
            _ => None,
        };
        let Some(line) = line else { continue };
        if output.write_all(format!("{line}\n").as_bytes()).await.is_err() {
            break;
        }
        let _ = output.flush().await;
    }
    updates.dispose().await;
}

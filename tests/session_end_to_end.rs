//! Scan session driving the HTTP backend end to end

mod common;

use common::{StubBackend, StubResponse};
use futures::channel::mpsc as input_channel;
use qrcheckin::attendance::api::{HttpApiConfig, HttpAttendanceApi};
use qrcheckin::notifications::api::{
    isolated_notification_service, publish_event, Event, EventFilter, LifecycleEvent,
    Subscription,
};
use qrcheckin::scan::api::{
    encode_badge, LifecyclePhase, Notice, NoticeKind, ScanMode, ScanSession, SessionCommand,
    SessionConfig, SessionInput,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

async fn next_notice(notices: &mut Subscription) -> Notice {
    loop {
        match timeout(Duration::from_secs(5), notices.recv())
            .await
            .expect("notice in time")
        {
            Some(Event::Notice(event)) => return event.notice,
            Some(_) => continue,
            None => panic!("notice subscription closed"),
        }
    }
}

fn http_api(base_url: &str) -> Arc<HttpAttendanceApi> {
    let mut config = HttpApiConfig::new(base_url);
    config.timeout = Duration::from_secs(5);
    Arc::new(HttpAttendanceApi::new(&config).expect("client builds"))
}

#[tokio::test]
async fn test_badge_scan_records_attendance_once() {
    let backend = StubBackend::start(StubResponse::json(
        200,
        r#"{"status":true,"message":"Attendance updated"}"#,
    ))
    .await;
    let service = isolated_notification_service();
    let mut notices = Subscription::open(&service, "observer", EventFilter::NoticeOnly, "test").await;
    let session = ScanSession::open(
        SessionConfig::new("e2e", ScanMode::Attendance),
        http_api(&backend.base_url),
        service.clone(),
    )
    .await;
    let mut armed = session.armed_signal();

    let (inputs, inputs_rx) = input_channel::unbounded();
    let run = tokio::spawn(session.run(inputs_rx, std::future::pending()));

    // The camera reports the same badge several times in a row
    let badge = encode_badge("evt123", "stu456").unwrap();
    for _ in 0..3 {
        inputs.unbounded_send(SessionInput::Payload(badge.clone())).unwrap();
    }

    let notice = next_notice(&mut notices).await;
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message.as_deref(), Some("Attendance updated"));

    inputs.unbounded_send(SessionCommand::Acknowledge.into()).unwrap();
    let _ = timeout(Duration::from_secs(5), armed.wait_for(|armed| *armed))
        .await
        .expect("re-armed in time");

    drop(inputs);
    let stats = timeout(Duration::from_secs(5), run)
        .await
        .expect("session stopped")
        .unwrap();

    assert_eq!(backend.requests().len(), 1);
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.succeeded, 1);
}

#[tokio::test]
async fn test_rejection_then_rescan_succeeds_on_next_badge() {
    let backend = StubBackend::start(StubResponse::json(
        400,
        r#"{"status":false,"message":"Student not registered"}"#,
    ))
    .await;
    let service = isolated_notification_service();
    let mut notices = Subscription::open(&service, "observer", EventFilter::NoticeOnly, "test").await;
    let session = ScanSession::open(
        SessionConfig::new("e2e-reject", ScanMode::Attendance),
        http_api(&backend.base_url),
        service.clone(),
    )
    .await;

    let (inputs, inputs_rx) = input_channel::unbounded();
    let run = tokio::spawn(session.run(inputs_rx, std::future::pending()));

    inputs.unbounded_send(SessionInput::Payload("evt1/stu1".to_string())).unwrap();
    let notice = next_notice(&mut notices).await;
    assert_eq!(notice.kind, NoticeKind::Failure);
    assert_eq!(notice.message.as_deref(), Some("Student not registered"));

    inputs.unbounded_send(SessionCommand::Rearm.into()).unwrap();
    inputs.unbounded_send(SessionInput::Payload("evt1/stu2".to_string())).unwrap();
    assert_eq!(next_notice(&mut notices).await.kind, NoticeKind::Failure);

    drop(inputs);
    let stats = timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert_eq!(stats.failed, 2);
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_background_during_request_discards_late_response() {
    let backend = StubBackend::start(
        StubResponse::json(200, r#"{"status":true}"#).delayed(Duration::from_millis(300)),
    )
    .await;
    let service = isolated_notification_service();
    let mut notices = Subscription::open(&service, "observer", EventFilter::NoticeOnly, "test").await;
    let session = ScanSession::open(
        SessionConfig::new("e2e-stale", ScanMode::Attendance),
        http_api(&backend.base_url),
        service.clone(),
    )
    .await;
    let mut armed = session.armed_signal();

    let (inputs, inputs_rx) = input_channel::unbounded();
    let run = tokio::spawn(session.run(inputs_rx, std::future::pending()));

    inputs.unbounded_send(SessionInput::Payload("evt1/stu1".to_string())).unwrap();
    let _ = timeout(Duration::from_secs(5), armed.wait_for(|armed| !*armed))
        .await
        .expect("locked in time");

    for phase in [LifecyclePhase::Background, LifecyclePhase::Foreground] {
        publish_event(&service, Event::Lifecycle(LifecycleEvent::new(phase))).await;
    }
    let _ = timeout(Duration::from_secs(5), armed.wait_for(|armed| *armed))
        .await
        .expect("re-armed in time");

    // Longer than the backend delay: the late success must not surface
    let late = timeout(Duration::from_millis(800), notices.recv()).await;
    assert!(late.is_err(), "stale result produced a notice: {late:?}");

    drop(inputs);
    let stats = timeout(Duration::from_secs(5), run).await.unwrap().unwrap();
    assert_eq!(stats.stale, 1);
    assert_eq!(stats.succeeded, 0);
}

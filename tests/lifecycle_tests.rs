mod common;

use std::time::Duration;

use common::{drain, fast_config, harness, harness_with, pump_for};
use jarvis::engine::EngineError;
use jarvis::session::event::{EngineEvent, RecognitionErrorKind, SessionEvent, Utterance};
use jarvis::session::state::Mode;

#[tokio::test]
async fn start_is_idempotent() {
    let mut h = harness(fast_config());
    h.session.start();
    h.session.start();
    drain(&mut h).await;

    assert_eq!(h.engine.starts(), 1, "exactly one live recognition session");
    assert!(h.session.is_running());
}

#[tokio::test]
async fn session_end_schedules_one_debounced_restart() {
    let mut h = harness(fast_config());
    h.session.start();
    drain(&mut h).await;

    h.session.handle_event(SessionEvent::Engine(EngineEvent::Ended));
    assert!(!h.session.is_running());
    assert!(
        h.rec.statuses().iter().any(|s| s.contains("Перезапуск")),
        "status announces the restart"
    );

    // A manual start while the debounce timer is pending must not produce a
    // second engine session.
    h.session.start();

    pump_for(&mut h, Duration::from_millis(60)).await;
    assert_eq!(h.engine.starts(), 2, "exactly one restart");
    assert!(h.session.is_running());
}

#[tokio::test]
async fn ended_while_armed_clears_the_window() {
    let mut h = harness(fast_config());
    h.session.start();
    drain(&mut h).await;

    h.session
        .handle_event(SessionEvent::Engine(EngineEvent::Result(Utterance::finalized("джарвис"))));
    assert_eq!(h.session.mode(), Mode::Armed);

    h.session.handle_event(SessionEvent::Engine(EngineEvent::Ended));
    assert_eq!(h.session.mode(), Mode::Idle);
    assert_eq!(h.rec.waiting().last(), Some(&false));

    // The grace timer died with the session: no re-prompt later.
    let acks = h.rec.speaks().len();
    pump_for(&mut h, Duration::from_millis(100)).await;
    assert_eq!(h.rec.speaks().len(), acks);
}

#[tokio::test]
async fn permission_denied_halts_without_restart() {
    let mut h = harness(fast_config());
    h.session.start();
    drain(&mut h).await;

    h.session.handle_event(SessionEvent::Engine(EngineEvent::Error(
        RecognitionErrorKind::PermissionDenied,
    )));
    // The engine's own end event trails the error.
    h.session.handle_event(SessionEvent::Engine(EngineEvent::Ended));

    assert!(h.session.is_halted());
    assert!(
        h.rec.statuses().iter().any(|s| s.contains("микрофону заблокирован")),
        "permission-specific message shown"
    );

    // Well past the debounce window: still exactly the original start.
    pump_for(&mut h, Duration::from_millis(80)).await;
    assert_eq!(h.engine.starts(), 1, "no automatic restart after a fatal error");
}

#[tokio::test]
async fn transient_error_recovers_through_session_end() {
    let mut h = harness(fast_config());
    h.session.start();
    drain(&mut h).await;

    h.session.handle_event(SessionEvent::Engine(EngineEvent::Error(
        RecognitionErrorKind::NoSpeech,
    )));
    assert!(
        h.rec.statuses().iter().any(|s| s.contains("no-speech")),
        "transient error surfaced in the status line"
    );
    assert!(!h.session.is_halted());

    h.session.handle_event(SessionEvent::Engine(EngineEvent::Ended));
    pump_for(&mut h, Duration::from_millis(60)).await;
    assert_eq!(h.engine.starts(), 2, "restarted after the natural session end");
}

#[tokio::test]
async fn missing_capability_halts_immediately() {
    let mut h = harness_with(fast_config(), |engine| {
        engine.fail_next_start(EngineError::CapabilityUnavailable);
    });
    h.session.start();
    drain(&mut h).await;

    assert!(h.session.is_halted());
    assert_eq!(h.engine.starts(), 0);
    assert!(
        h.rec.statuses().iter().any(|s| s.contains("недоступно")),
        "unsupported-host message shown once"
    );

    // And it stays down.
    pump_for(&mut h, Duration::from_millis(60)).await;
    assert_eq!(h.engine.starts(), 0);
}

#[tokio::test]
async fn transient_start_failure_retries_with_backoff() {
    let mut h = harness_with(fast_config(), |engine| {
        engine.fail_next_start(EngineError::Failed("audio device busy".to_string()));
    });
    h.session.start();
    assert_eq!(h.engine.starts(), 0);

    pump_for(&mut h, Duration::from_millis(60)).await;
    assert_eq!(h.engine.starts(), 1, "second attempt succeeded");
    assert!(h.session.is_running());
}

#[tokio::test]
async fn start_retries_are_capped() {
    let mut h = harness_with(fast_config(), |engine| {
        for _ in 0..4 {
            engine.fail_next_start(EngineError::Failed("audio device busy".to_string()));
        }
    });
    h.session.start();
    pump_for(&mut h, Duration::from_millis(150)).await;

    assert_eq!(h.engine.starts(), 0);
    assert!(h.session.is_halted(), "gave up after the retry cap");
    assert!(
        h.rec.statuses().iter().any(|s| s.contains("Ошибка")),
        "exhausted retries surface an error status"
    );
}

#[tokio::test]
async fn duplicate_engine_start_is_swallowed() {
    // Engine-level AlreadyStarted (the session thought it was stopped, the
    // engine disagreed): logged, no status change, no crash.
    let mut h = harness_with(fast_config(), |engine| {
        engine.fail_next_start(EngineError::AlreadyStarted);
    });
    h.session.start();
    drain(&mut h).await;

    assert!(!h.session.is_halted());
    assert!(h.rec.statuses().is_empty(), "nothing surfaced to the user");
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use jarvis::engine::scripted::{EngineCounters, ScriptedEngine};
use jarvis::outputs::speaker::Speaker;
use jarvis::outputs::status::StatusSink;
use jarvis::services::dispatch::CommandDispatcher;
use jarvis::session::config::SessionConfig;
use jarvis::session::event::SessionEvent;
use jarvis::session::manager::{session_channel, VoiceSession};

/// Shared recorders for everything the session does to its collaborators.
#[derive(Clone, Default)]
pub struct Recorder {
    speaks: Arc<Mutex<Vec<String>>>,
    statuses: Arc<Mutex<Vec<String>>>,
    waiting: Arc<Mutex<Vec<bool>>>,
    dispatches: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn speaks(&self) -> Vec<String> {
        self.speaks.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn waiting(&self) -> Vec<bool> {
        self.waiting.lock().unwrap().clone()
    }

    pub fn dispatches(&self) -> Vec<String> {
        self.dispatches.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }
}

struct RecordingSpeaker(Recorder);

impl Speaker for RecordingSpeaker {
    fn speak(&self, text: &str) {
        self.0.speaks.lock().unwrap().push(text.to_string());
    }
}

struct RecordingStatus(Recorder);

impl StatusSink for RecordingStatus {
    fn set_status(&self, text: &str) {
        self.0.statuses.lock().unwrap().push(text.to_string());
    }

    fn set_waiting(&self, waiting: bool) {
        self.0.waiting.lock().unwrap().push(waiting);
    }
}

struct RecordingDispatcher(Recorder);

impl CommandDispatcher for RecordingDispatcher {
    fn dispatch(&self, text: &str) {
        self.0.dispatches.lock().unwrap().push(text.to_string());
    }
}

pub struct Harness {
    pub session: VoiceSession,
    pub tx: mpsc::Sender<SessionEvent>,
    pub rec: Recorder,
    pub engine: EngineCounters,
}

/// Build a session wired to a scripted engine and recording collaborators.
/// The closure customizes the engine (scripts, forced start failures).
pub fn harness_with(config: SessionConfig, customize: impl FnOnce(&mut ScriptedEngine)) -> Harness {
    let (tx, rx) = session_channel();
    let mut engine = ScriptedEngine::new(tx.clone());
    customize(&mut engine);
    let counters = engine.counters();

    let rec = Recorder::default();
    let session = VoiceSession::new(
        rx,
        tx.clone(),
        Box::new(engine),
        Arc::new(RecordingSpeaker(rec.clone())),
        Arc::new(RecordingStatus(rec.clone())),
        Arc::new(RecordingDispatcher(rec.clone())),
        config,
    );

    Harness {
        session,
        tx,
        rec,
        engine: counters,
    }
}

pub fn harness(config: SessionConfig) -> Harness {
    harness_with(config, |_| {})
}

/// Fast timings so the integration tests exercise real timers without
/// waiting for the production 3-second grace window.
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        command_grace: Duration::from_millis(40),
        restart_debounce: Duration::from_millis(10),
        start_retry_backoff: Duration::from_millis(10),
        ..SessionConfig::default()
    }
}

/// Run the session loop for a wall-clock duration, handling whatever events
/// (engine callbacks, timer fires) arrive in that window.
pub async fn pump_for(h: &mut Harness, dur: Duration) {
    let deadline = tokio::time::Instant::now() + dur;
    loop {
        let now = tokio::time::Instant::now();
        if now >= deadline {
            return;
        }
        match tokio::time::timeout(deadline - now, h.session.next_event()).await {
            Ok(Some(event)) => h.session.handle_event(event),
            Ok(None) | Err(_) => return,
        }
    }
}

/// Handle everything already sitting in the inbox, without waiting for
/// timers.
pub async fn drain(h: &mut Harness) {
    pump_for(h, Duration::from_millis(5)).await;
}

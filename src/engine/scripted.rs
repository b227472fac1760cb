use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use super::{EngineError, RecognitionEngine};
use crate::session::event::{EngineEvent, SessionEvent};

/// Shared counters for asserting engine lifecycle in tests.
#[derive(Debug, Clone, Default)]
pub struct EngineCounters {
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl EngineCounters {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// Deterministic engine fed from a prepared script. Each `start()` replays
/// the next queued session; `stop()` emits `Ended` like a real engine would.
/// Used by the integration tests and for offline dry runs.
pub struct ScriptedEngine {
    tx: mpsc::Sender<SessionEvent>,
    sessions: VecDeque<Vec<EngineEvent>>,
    /// Errors to return from upcoming `start()` calls, in order.
    start_failures: VecDeque<EngineError>,
    started: bool,
    counters: EngineCounters,
}

impl ScriptedEngine {
    pub fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            tx,
            sessions: VecDeque::new(),
            start_failures: VecDeque::new(),
            started: false,
            counters: EngineCounters::default(),
        }
    }

    /// Queue the events one engine session will deliver after `start()`.
    /// `Started` is implicit; do not include it.
    pub fn push_session(&mut self, events: Vec<EngineEvent>) {
        self.sessions.push_back(events);
    }

    /// Make the next `start()` call fail with the given error.
    pub fn fail_next_start(&mut self, err: EngineError) {
        self.start_failures.push_back(err);
    }

    pub fn counters(&self) -> EngineCounters {
        self.counters.clone()
    }

    fn emit(&self, event: EngineEvent) {
        // Bounded channel; the session drains it on the same task, so a full
        // inbox here means the script is broken, not the session.
        if self.tx.try_send(SessionEvent::Engine(event)).is_err() {
            debug!("scripted engine: session inbox closed or full, event dropped");
        }
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn start(&mut self) -> Result<(), EngineError> {
        if self.started {
            return Err(EngineError::AlreadyStarted);
        }
        if let Some(err) = self.start_failures.pop_front() {
            return Err(err);
        }

        self.started = true;
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        self.emit(EngineEvent::Started);

        let events = self.sessions.pop_front().unwrap_or_default();
        for event in events {
            // A scripted `Ended`/fatal error terminates the session the same
            // way a real engine end would.
            if matches!(event, EngineEvent::Ended) {
                self.started = false;
            }
            self.emit(event);
        }
        Ok(())
    }

    fn stop(&mut self) {
        if !self.started {
            return; // already stopped, swallowed
        }
        self.started = false;
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
        self.emit(EngineEvent::Ended);
    }
}

use std::sync::Arc;
use std::time::Duration;

use rand::seq::IndexedRandom;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::event::{EngineEvent, RecognitionErrorKind, SessionEvent};
use super::state::{self, Effect, Mode, WakeGraph};
use crate::engine::{EngineError, RecognitionEngine};
use crate::outputs::speaker::Speaker;
use crate::outputs::status::StatusSink;
use crate::services::dispatch::CommandDispatcher;

/// Inbox capacity. The session drains faster than any engine produces; a
/// full inbox means the loop is gone, not slow.
const INBOX_CAPACITY: usize = 64;

pub fn session_channel() -> (mpsc::Sender<SessionEvent>, mpsc::Receiver<SessionEvent>) {
    mpsc::channel(INBOX_CAPACITY)
}

/// The always-on voice command session.
///
/// Owns exactly one recognition engine and at most one live grace timer.
/// Every engine callback and every timer fire arrives through one inbox and
/// is handled to completion before the next, so no locking is needed around
/// the mode.
pub struct VoiceSession {
    rx: mpsc::Receiver<SessionEvent>,
    tx: mpsc::Sender<SessionEvent>,
    engine: Box<dyn RecognitionEngine>,
    speaker: Arc<dyn Speaker>,
    status: Arc<dyn StatusSink>,
    dispatcher: Arc<dyn CommandDispatcher>,
    config: SessionConfig,

    mode: Mode,
    running: bool,
    /// Set by a fatal condition (no capability, permission denied, retries
    /// exhausted). A halted session never auto-restarts.
    halted: bool,
    restart_pending: bool,
    start_attempts: u32,

    // Generation counters invalidate timer fires already in flight.
    grace_generation: u64,
    restart_generation: u64,
    grace_timer: Option<JoinHandle<()>>,
}

impl VoiceSession {
    pub fn new(
        rx: mpsc::Receiver<SessionEvent>,
        tx: mpsc::Sender<SessionEvent>,
        engine: Box<dyn RecognitionEngine>,
        speaker: Arc<dyn Speaker>,
        status: Arc<dyn StatusSink>,
        dispatcher: Arc<dyn CommandDispatcher>,
        config: SessionConfig,
    ) -> Self {
        Self {
            rx,
            tx,
            engine,
            speaker,
            status,
            dispatcher,
            config,
            mode: Mode::Idle,
            running: false,
            halted: false,
            restart_pending: false,
            start_attempts: 0,
            grace_generation: 0,
            restart_generation: 0,
            grace_timer: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Begin (or resume) continuous recognition. Idempotent: a second call
    /// while a session is live, or while a restart is pending, is a no-op.
    pub fn start(&mut self) {
        if self.halted || self.running || self.restart_pending {
            return;
        }

        match self.engine.start() {
            Ok(()) => {
                self.running = true;
                self.start_attempts = 0;
            }
            Err(EngineError::AlreadyStarted) => {
                // Engine-level double start. Swallowed, logged, not surfaced.
                warn!("duplicate recognition start ignored");
            }
            Err(EngineError::CapabilityUnavailable) => {
                self.halted = true;
                self.status.set_status(&state::unsupported_status());
            }
            Err(EngineError::Failed(reason)) => {
                if self.start_attempts < self.config.max_start_retries {
                    self.start_attempts += 1;
                    warn!(
                        "engine start failed ({}), retry {}/{}",
                        reason, self.start_attempts, self.config.max_start_retries
                    );
                    self.schedule_restart(self.config.start_retry_backoff);
                } else {
                    self.halted = true;
                    self.status
                        .set_status(&state::error_status(&RecognitionErrorKind::Other(reason)));
                }
            }
        }
    }

    /// Single entry point for all state transitions.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Engine(engine_event) => self.handle_engine_event(engine_event),
            SessionEvent::GraceElapsed { generation } => {
                // STALE REJECTION: the timer this fire belongs to was
                // cancelled or replaced after the fire left the task.
                if generation != self.grace_generation {
                    debug!("stale grace fire discarded (gen {} vs {})", generation, self.grace_generation);
                    return;
                }
                let (mode, effects) = WakeGraph::on_grace_elapsed(self.mode, &self.config);
                self.mode = mode;
                self.apply(effects);
            }
            SessionEvent::RestartDue { generation } => {
                if generation != self.restart_generation || !self.restart_pending {
                    debug!("stale restart discarded");
                    return;
                }
                self.restart_pending = false;
                self.start();
            }
        }
    }

    /// Pull the next inbox event. Exposed so tests drive the loop manually.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Driver loop: start listening, then handle events until shutdown.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("voice session starting (wake phrase: '{}')", self.config.wake_phrase);
        self.start();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.engine.stop();
                    break;
                }
                event = self.rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                }
            }
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started => {
                // Fresh engine session always begins idle.
                self.mode = Mode::Idle;
                self.status
                    .set_status(&state::ready_status(&self.config.wake_phrase));
            }
            EngineEvent::Result(utterance) => {
                let (mode, effects) = WakeGraph::on_result(self.mode, &utterance, &self.config);
                self.mode = mode;
                self.apply(effects);
            }
            EngineEvent::Ended => {
                self.running = false;
                let will_restart = !self.halted;
                let (mode, effects) = WakeGraph::on_ended(self.mode, will_restart);
                self.mode = mode;
                self.apply(effects);
                if will_restart {
                    self.schedule_restart(self.config.restart_debounce);
                }
            }
            EngineEvent::Error(kind) => {
                self.running = false;
                if kind.is_fatal() {
                    // Permission-class failures would spam error loops if we
                    // kept restarting. Surface once and stand down.
                    self.halted = true;
                }
                let (mode, effects) = WakeGraph::on_error(self.mode, &kind);
                self.mode = mode;
                self.apply(effects);
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SpeakAck => {
                    if let Some(ack) = self.config.ack_responses.choose(&mut rand::rng()) {
                        self.speaker.speak(ack);
                        self.status.set_status(&state::awaiting_with_ack_status(ack));
                    }
                }
                Effect::SetStatus(text) => self.status.set_status(&text),
                Effect::MarkWaiting(waiting) => self.status.set_waiting(waiting),
                Effect::Dispatch(command) => {
                    info!("voice command: '{}'", command);
                    self.dispatcher.dispatch(&command);
                }
                Effect::ArmGraceTimer => self.arm_grace_timer(),
                Effect::CancelGraceTimer => self.cancel_grace_timer(),
                Effect::StopEngine => self.engine.stop(),
            }
        }
    }

    fn arm_grace_timer(&mut self) {
        // At most one live timer: arming always cancels the previous one.
        self.cancel_grace_timer();
        let generation = self.grace_generation;
        let grace = self.config.command_grace;
        let tx = self.tx.clone();
        self.grace_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = tx.send(SessionEvent::GraceElapsed { generation }).await;
        }));
    }

    fn cancel_grace_timer(&mut self) {
        if let Some(timer) = self.grace_timer.take() {
            timer.abort();
        }
        // A fire that already left the aborted task is now stale.
        self.grace_generation += 1;
    }

    fn schedule_restart(&mut self, delay: Duration) {
        if self.restart_pending {
            // A start is already on its way; the second request is a no-op.
            return;
        }
        self.restart_pending = true;
        self.restart_generation += 1;
        let generation = self.restart_generation;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SessionEvent::RestartDue { generation }).await;
        });
    }
}

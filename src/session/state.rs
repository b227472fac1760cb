use super::config::{SessionConfig, TimeoutPolicy};
use super::event::{RecognitionErrorKind, Utterance};
use super::wake;

/// The two listening modes of the session.
/// Strict cycle: Idle -> (wake detected) -> Armed -> (dispatch | timeout |
/// error | end) -> Idle. Armed periods never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Listening for the wake phrase.
    Idle,
    /// Wake phrase heard, awaiting a command within the grace window.
    Armed,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Idle
    }
}

/// Side effects requested by a transition. The manager executes them against
/// the injected collaborators; this module never touches I/O itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Speak a randomly chosen acknowledgement and show it in the status line.
    SpeakAck,
    SetStatus(String),
    /// Toggle the "waiting for command" indicator.
    MarkWaiting(bool),
    /// Forward extracted command text to the dispatcher.
    Dispatch(String),
    ArmGraceTimer,
    CancelGraceTimer,
    /// Stop the engine session to force a clean restart cycle.
    StopEngine,
}

// Status line texts. The UI locale is fixed (ru-RU), same as the recognizer.
pub fn ready_status(wake_phrase: &str) -> String {
    format!("Готов к работе (активация: {})", wake_phrase)
}

pub fn awaiting_status() -> String {
    "Ожидаю команду...".to_string()
}

pub fn awaiting_with_ack_status(ack: &str) -> String {
    format!("Ожидаю команду... (Ответ: {})", ack)
}

pub fn stopped_status() -> String {
    "Прослушивание остановлено. Перезапуск...".to_string()
}

pub fn error_status(kind: &RecognitionErrorKind) -> String {
    format!("Ошибка распознавания: {}", kind.as_str())
}

pub fn permission_status() -> String {
    "Доступ к микрофону заблокирован. Проверьте HTTPS/разрешения!".to_string()
}

pub fn unsupported_status() -> String {
    "Распознавание речи недоступно на этом устройстве.".to_string()
}

/// The wake-command state machine.
/// Pure function core: (Mode, event, config) -> (Mode, Effects).
/// No I/O, no timers, no randomness; fully testable with fake transcripts.
pub struct WakeGraph;

impl WakeGraph {
    /// Transcript batch arrived.
    pub fn on_result(mode: Mode, utt: &Utterance, cfg: &SessionConfig) -> (Mode, Vec<Effect>) {
        match mode {
            Mode::Idle => Self::on_idle_result(utt, cfg),
            Mode::Armed => Self::on_armed_result(utt, cfg),
        }
    }

    fn on_idle_result(utt: &Utterance, cfg: &SessionConfig) -> (Mode, Vec<Effect>) {
        let current = utt.current_text();
        if !wake::contains_wake(current, &cfg.wake_phrase) {
            return (Mode::Idle, Vec::new());
        }

        // Wake phrase heard. If a finalized command trails it in the same
        // batch ("джарвис очисти чек"), dispatch right away and skip the
        // acknowledgement step.
        let trailing = wake::text_after_wake(current, &cfg.wake_phrase).unwrap_or_default();
        if utt.has_final() && !trailing.is_empty() {
            return (
                Mode::Idle,
                vec![
                    Effect::CancelGraceTimer,
                    Effect::MarkWaiting(false),
                    Effect::StopEngine,
                    Effect::Dispatch(trailing),
                ],
            );
        }

        // Bare activation: acknowledge and open the grace window.
        (
            Mode::Armed,
            vec![
                Effect::MarkWaiting(true),
                Effect::SetStatus(awaiting_status()),
                Effect::SpeakAck,
                Effect::ArmGraceTimer,
            ],
        )
    }

    fn on_armed_result(utt: &Utterance, cfg: &SessionConfig) -> (Mode, Vec<Effect>) {
        // Interim noise keeps the window open; only finalized text counts.
        if !utt.has_final() {
            return (Mode::Armed, Vec::new());
        }

        // Strip every wake occurrence: the user may have repeated the phrase
        // before the command ("джарвис ... покажи отчет").
        let command = wake::strip_wake(&utt.final_text, &cfg.wake_phrase);
        if command.is_empty() {
            // Nothing left after stripping. Stay armed, wait for more input
            // or the timeout.
            return (Mode::Armed, Vec::new());
        }

        (
            Mode::Idle,
            vec![
                Effect::CancelGraceTimer,
                Effect::MarkWaiting(false),
                Effect::StopEngine,
                Effect::Dispatch(command),
            ],
        )
    }

    /// Grace window elapsed with no command.
    pub fn on_grace_elapsed(mode: Mode, cfg: &SessionConfig) -> (Mode, Vec<Effect>) {
        match (mode, cfg.timeout_policy) {
            (Mode::Armed, TimeoutPolicy::Reprompt) => {
                // Nudge the user and keep waiting.
                (Mode::Armed, vec![Effect::SpeakAck, Effect::ArmGraceTimer])
            }
            (Mode::Armed, TimeoutPolicy::Disarm) => (
                Mode::Idle,
                vec![
                    Effect::MarkWaiting(false),
                    Effect::SetStatus(ready_status(&cfg.wake_phrase)),
                ],
            ),
            // Stale fire after a disarm. Nothing to do.
            (Mode::Idle, _) => (Mode::Idle, Vec::new()),
        }
    }

    /// Engine session ended (naturally or after an explicit stop).
    /// `will_restart` is false when the session was halted by a fatal error;
    /// the "restarting" status would lie in that case.
    pub fn on_ended(_mode: Mode, will_restart: bool) -> (Mode, Vec<Effect>) {
        let mut effects = vec![Effect::CancelGraceTimer, Effect::MarkWaiting(false)];
        if will_restart {
            effects.push(Effect::SetStatus(stopped_status()));
        }
        (Mode::Idle, effects)
    }

    /// Engine reported a failure. Restarting is the manager's call: fatal
    /// kinds must not loop, transient ones ride the natural end-of-session
    /// restart.
    pub fn on_error(_mode: Mode, kind: &RecognitionErrorKind) -> (Mode, Vec<Effect>) {
        let status = if kind.is_fatal() {
            permission_status()
        } else {
            error_status(kind)
        };
        (
            Mode::Idle,
            vec![
                Effect::CancelGraceTimer,
                Effect::MarkWaiting(false),
                Effect::SetStatus(status),
            ],
        )
    }
}

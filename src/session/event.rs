/// One batch of transcript fragments delivered by the recognition engine.
/// `result_index` is the offset of the first fragment the engine has not yet
/// finalized in an earlier event, so no fragment is processed twice within a
/// session. Lives only for the duration of one event.
#[derive(Debug, Clone, Default)]
pub struct Utterance {
    pub final_text: String,
    pub interim_text: String,
    pub result_index: usize,
}

impl Utterance {
    pub fn finalized(text: &str) -> Self {
        Self {
            final_text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn interim(text: &str) -> Self {
        Self {
            interim_text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn has_final(&self) -> bool {
        !self.final_text.trim().is_empty()
    }

    /// Finalized text wins over interim text when both are present.
    pub fn current_text(&self) -> &str {
        if self.has_final() {
            &self.final_text
        } else {
            &self.interim_text
        }
    }
}

/// Engine error kinds, mirroring the error tokens the speech service reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    /// Microphone access blocked. Fatal: no automatic restart.
    PermissionDenied,
    /// The recognition service itself refused. Fatal as well.
    ServiceDenied,
    /// Nothing was said before the engine gave up. Recoverable.
    NoSpeech,
    /// Session aborted mid-flight. Recoverable.
    Aborted,
    /// Transport failure between host and recognition service. Recoverable.
    Network,
    Other(String),
}

impl RecognitionErrorKind {
    /// Fatal kinds must not trigger an automatic restart loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::ServiceDenied)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PermissionDenied => "not-allowed",
            Self::ServiceDenied => "service-not-allowed",
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::Network => "network",
            Self::Other(s) => s,
        }
    }
}

/// Events emitted by the underlying recognition engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    Started,
    Result(Utterance),
    Ended,
    Error(RecognitionErrorKind),
}

/// The session inbox. Engine callbacks and internal timers all land here,
/// so handlers never overlap.
///
/// Timer events carry a generation counter. A fire whose generation no longer
/// matches the live one is stale and gets discarded (the timer it belonged to
/// was cancelled or superseded after the fire was already in flight).
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Engine(EngineEvent),
    GraceElapsed { generation: u64 },
    RestartDue { generation: u64 },
}

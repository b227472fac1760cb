use std::sync::Mutex;

use tracing::warn;

/// Text-to-speech capability. Fire-and-forget, best-effort: a speaker that
/// cannot play simply does nothing.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str);
}

/// Speaks by spawning an external TTS command (`say` by default). Any
/// still-running previous utterance is killed first, so a new acknowledgement
/// always cuts off the old one.
pub struct ProcessSpeaker {
    command: String,
    current: Mutex<Option<tokio::process::Child>>,
}

impl ProcessSpeaker {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            current: Mutex::new(None),
        }
    }
}

impl Default for ProcessSpeaker {
    fn default() -> Self {
        Self::new("say")
    }
}

impl Speaker for ProcessSpeaker {
    fn speak(&self, text: &str) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(mut child) = current.take() {
            let _ = child.start_kill();
        }

        match tokio::process::Command::new(&self.command)
            .arg(text)
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => *current = Some(child),
            Err(e) => warn!("failed to spawn '{}': {}", self.command, e),
        }
    }
}

/// For headless runs and tests that don't care about audio.
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn speak(&self, _text: &str) {}
}

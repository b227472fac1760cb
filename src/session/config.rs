use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happens when the command grace window elapses while armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutPolicy {
    /// Speak a fresh acknowledgement, stay armed, re-arm the timer.
    Reprompt,
    /// Silently drop back to idle.
    Disarm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Case-insensitive substring to match against the transcript.
    /// Unanchored on purpose: a fragment embedded in a longer word also
    /// activates. Known limitation of the matching contract.
    pub wake_phrase: String,
    /// Spoken acknowledgements, chosen uniformly at random on activation.
    pub ack_responses: Vec<String>,
    /// How long to wait for a command after activation.
    pub command_grace: Duration,
    pub timeout_policy: TimeoutPolicy,
    /// Delay before restarting a session that ended, so a flapping engine
    /// does not produce a tight restart loop.
    pub restart_debounce: Duration,
    /// Capped retry on a transient start failure.
    pub max_start_retries: u32,
    pub start_retry_backoff: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wake_phrase: "джарвис".to_string(),
            ack_responses: vec![
                "Да, сэр.".to_string(),
                "Слушаю, сэр.".to_string(),
                "К вашим услугам.".to_string(),
            ],
            command_grace: Duration::from_millis(3000),
            timeout_policy: TimeoutPolicy::Reprompt,
            restart_debounce: Duration::from_millis(100),
            max_start_retries: 3,
            start_retry_backoff: Duration::from_millis(2000),
        }
    }
}

/// Settings handed to the recognition engine at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    pub continuous: bool,
    pub interim_results: bool,
    pub locale: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: true,
            locale: "ru-RU".to_string(),
        }
    }
}

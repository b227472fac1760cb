pub mod console;
pub mod scripted;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The host has no speech-recognition capability at all. Non-retryable.
    #[error("speech recognition capability unavailable")]
    CapabilityUnavailable,
    /// Duplicate start. Swallowed and logged by the session, never surfaced.
    #[error("recognition session already started")]
    AlreadyStarted,
    /// Transient start failure, eligible for a capped retry.
    #[error("engine start failed: {0}")]
    Failed(String),
}

/// A continuous speech-recognition engine.
///
/// The engine owns the microphone (exclusively, one live instance at a time)
/// and delivers `EngineEvent`s into the session channel it was constructed
/// with. Control stays synchronous; all results arrive as events.
pub trait RecognitionEngine: Send {
    fn start(&mut self) -> Result<(), EngineError>;

    /// Idempotent. Stopping an engine that is not running is a no-op, never
    /// an error. A stopped session is announced via `EngineEvent::Ended`.
    fn stop(&mut self);
}

use std::sync::Arc;

use jarvis::engine::console::ConsoleEngine;
use jarvis::outputs::speaker::{NullSpeaker, ProcessSpeaker, Speaker};
use jarvis::outputs::status::LogStatus;
use jarvis::services::dispatch::HttpDispatcher;
use jarvis::session::config::{EngineSettings, SessionConfig};
use jarvis::session::manager::{session_channel, VoiceSession};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("Jarvis voice session booting...");

    let config = SessionConfig::default();
    let settings = EngineSettings::default();

    let backend_url =
        std::env::var("POS_BACKEND_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

    let (tx, rx) = session_channel();
    let engine = ConsoleEngine::new(tx.clone(), settings);

    // JARVIS_TTS overrides the external TTS command ("off" silences it).
    // Speaking is best-effort either way: a missing command logs a warning.
    let speaker: Arc<dyn Speaker> = match std::env::var("JARVIS_TTS").as_deref() {
        Ok("off") => Arc::new(NullSpeaker),
        Ok(cmd) if !cmd.is_empty() => Arc::new(ProcessSpeaker::new(cmd)),
        _ => Arc::new(ProcessSpeaker::default()),
    };

    let mut session = VoiceSession::new(
        rx,
        tx,
        Box::new(engine),
        speaker,
        Arc::new(LogStatus),
        Arc::new(HttpDispatcher::new(backend_url)),
        config,
    );

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        signal.cancel();
    });

    tracing::info!("Session active. Type transcripts on stdin, Ctrl+C to stop.");
    session.run(shutdown).await;

    Ok(())
}

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::{EngineError, RecognitionEngine};
use crate::session::config::EngineSettings;
use crate::session::event::{EngineEvent, SessionEvent, Utterance};

/// Development harness engine: every stdin line is one finalized utterance.
/// Stands in for a real streaming recognizer so the whole session can be
/// driven end-to-end from a terminal.
pub struct ConsoleEngine {
    tx: mpsc::Sender<SessionEvent>,
    settings: EngineSettings,
    reader: Option<JoinHandle<()>>,
}

impl ConsoleEngine {
    pub fn new(tx: mpsc::Sender<SessionEvent>, settings: EngineSettings) -> Self {
        Self {
            tx,
            settings,
            reader: None,
        }
    }

    fn is_running(&self) -> bool {
        self.reader.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl RecognitionEngine for ConsoleEngine {
    fn start(&mut self) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::AlreadyStarted);
        }

        info!(
            locale = %self.settings.locale,
            continuous = self.settings.continuous,
            interim_results = self.settings.interim_results,
            "console engine session starting"
        );

        let tx = self.tx.clone();
        self.reader = Some(tokio::spawn(async move {
            let _ = tx.send(SessionEvent::Engine(EngineEvent::Started)).await;

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut result_index = 0usize;
            while let Ok(Some(line)) = lines.next_line().await {
                // The recognizer delivers lowercased fragments; mimic that.
                let text = line.trim().to_lowercase();
                if text.is_empty() {
                    continue;
                }
                let utt = Utterance {
                    final_text: text,
                    interim_text: String::new(),
                    result_index,
                };
                result_index += 1;
                if tx.send(SessionEvent::Engine(EngineEvent::Result(utt))).await.is_err() {
                    return; // session gone
                }
            }

            // stdin closed: the session ends like a natural engine end.
            let _ = tx.send(SessionEvent::Engine(EngineEvent::Ended)).await;
        }));

        Ok(())
    }

    fn stop(&mut self) {
        let Some(handle) = self.reader.take() else {
            return; // already stopped, swallowed
        };
        if !handle.is_finished() {
            handle.abort();
            let _ = self.tx.try_send(SessionEvent::Engine(EngineEvent::Ended));
        }
    }
}

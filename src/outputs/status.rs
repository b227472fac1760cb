use tracing::info;

/// Status display capability. Called synchronously and often; must not fail.
pub trait StatusSink: Send + Sync {
    fn set_status(&self, text: &str);

    /// Visual "waiting for command" indicator.
    fn set_waiting(&self, waiting: bool);
}

/// Default sink: the status line goes to the log.
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn set_status(&self, text: &str) {
        info!(target: "jarvis::status", "{}", text);
    }

    fn set_waiting(&self, waiting: bool) {
        info!(target: "jarvis::status", waiting, "command indicator");
    }
}

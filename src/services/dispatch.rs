use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Command dispatch capability, owned by the surrounding POS application.
/// The session only forwards extracted text; interpreting "очисти чек" vs
/// "покажи отчет" is entirely the collaborator's business, and so are its
/// failures.
pub trait CommandDispatcher: Send + Sync {
    fn dispatch(&self, text: &str);
}

#[derive(Serialize)]
struct CommandRequest {
    request_id: Uuid,
    text: String,
}

#[derive(Deserialize)]
struct CommandResponse {
    #[serde(default)]
    reply: Option<String>,
}

/// Forwards command text to the POS backend over HTTP.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Client,
    base_url: String,
}

impl HttpDispatcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5)) // HARD timeout, backend must not stall the terminal
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

impl CommandDispatcher for HttpDispatcher {
    fn dispatch(&self, text: &str) {
        let client = self.client.clone();
        let url = format!("{}/api/ai/command", self.base_url);
        let request = CommandRequest {
            request_id: Uuid::new_v4(),
            text: text.to_string(),
        };

        // Fire-and-forget: the session never blocks on the backend, and
        // dispatch errors stay here (logged), they do not feed back into the
        // listening state machine.
        tokio::spawn(async move {
            let request_id = request.request_id;
            match client.post(&url).json(&request).send().await {
                Ok(resp) if resp.status().is_success() => {
                    match resp.json::<CommandResponse>().await {
                        Ok(body) => {
                            if let Some(reply) = body.reply {
                                info!(%request_id, "backend reply: {}", reply);
                            }
                        }
                        Err(e) => warn!(%request_id, "unreadable backend reply: {}", e),
                    }
                }
                Ok(resp) => warn!(%request_id, "command rejected: HTTP {}", resp.status()),
                Err(e) => warn!(%request_id, "command dispatch failed: {}", e),
            }
        });
    }
}

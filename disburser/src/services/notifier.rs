//! Telegram notifications
//!
//! Delivery is spawned onto the runtime and never awaited by the caller.
//! Without a configured bot the notifier only logs. Messages go out as
//! Markdown; a message Telegram refuses to parse is resent as plain text.

use std::time::Duration;
use reqwest::StatusCode;
use serde::Serialize;

use shared::{component_debug, component_warn, Component};
use crate::config::TelegramTarget;
use crate::traits::Notifier;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

/// Fire-and-forget notifier backed by the Telegram Bot API
pub struct TelegramNotifier {
    target: Option<TelegramTarget>,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(target: Option<TelegramTarget>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { target, client }
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    fn endpoint(target: &TelegramTarget) -> String {
        format!(
            "{}/bot{}/sendMessage",
            target.api_base.as_str().trim_end_matches('/'),
            target.bot_token
        )
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, message: &str) {
        let Some(target) = &self.target else {
            component_debug!(Component::Notifier, "🔕 Notification skipped (no bot configured): {}", message);
            return;
        };

        let client = self.client.clone();
        let endpoint = Self::endpoint(target);
        let chat_id = target.chat_id.clone();
        let text = message.to_string();

        tokio::spawn(async move {
            let markdown = SendMessage {
                chat_id: &chat_id,
                text: &text,
                parse_mode: Some("Markdown"),
            };

            let first = client.post(&endpoint).json(&markdown).send().await;
            let response = match first {
                Ok(response) if response.status() == StatusCode::BAD_REQUEST => {
                    component_debug!(Component::Notifier, "Markdown rejected, resending as plain text");
                    let plain = SendMessage { parse_mode: None, ..markdown };
                    client.post(&endpoint).json(&plain).send().await
                }
                other => other,
            };

            match response {
                Ok(response) if response.status().is_success() => {
                    component_debug!(Component::Notifier, "📨 Notification delivered");
                }
                Ok(response) => {
                    component_warn!(Component::Notifier, "Notification rejected: HTTP {}", response.status());
                }
                Err(e) => {
                    component_warn!(Component::Notifier, "Notification failed: {}", e);
                }
            }
        });
    }
}

use async_trait::async_trait;
use std::time::Duration;

use crate::{Alert, NotificationChannel, NotificationError, MAX_CONTENT_LEN};

/// Posts `{"content": <message>}` to a single Discord-style webhook.
pub struct WebhookNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            webhook_url: webhook_url.into(),
            client,
        })
    }
}

fn truncate_content(message: &str) -> String {
    if message.chars().count() <= MAX_CONTENT_LEN {
        return message.to_string();
    }
    message.chars().take(MAX_CONTENT_LEN).collect()
}

#[async_trait]
impl NotificationChannel for WebhookNotifier {
    async fn send(&self, alert: &Alert) -> Result<u16, NotificationError> {
        let payload = serde_json::json!({
            "content": truncate_content(&alert.message),
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        tracing::info!("Discord alert sent with status code: {}", status.as_u16());

        if !status.is_success() {
            return Err(NotificationError::DeliveryFailure {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(status.as_u16())
    }

    fn name(&self) -> &str {
        "discord-webhook"
    }
}

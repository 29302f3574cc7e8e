mod templates;
mod webhook;

pub use templates::{format_percent, AlertTemplate};
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use screener_core::Trigger;
use std::time::Duration;

/// Discord refuses `content` longer than this.
pub const MAX_CONTENT_LEN: usize = 2000;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A rendered alert ready to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub symbol: String,
    pub message: String,
}

impl Alert {
    pub fn new(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            message: message.into(),
        }
    }

    /// Render the alert text for a trigger with the given EMA period.
    pub fn from_trigger(trigger: &Trigger, period: usize) -> Self {
        Self::new(trigger.symbol(), AlertTemplate::render(trigger, period))
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver an alert, returning the HTTP status on success.
    async fn send(&self, alert: &Alert) -> Result<u16, NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Delivery failed with HTTP {status}: {body}")]
    DeliveryFailure { status: u16, body: String },
    #[error("Webhook transport error: {0}")]
    Transport(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for outbound alerts.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
    pub timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl NotificationConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            webhook_url: lookup("DISCORD_WEBHOOK_URL")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Build the configured channel, or `None` when no webhook is set.
    pub fn build_channel(&self) -> Result<Option<WebhookNotifier>, NotificationError> {
        match self.webhook_url {
            Some(ref url) => {
                let notifier = WebhookNotifier::new(url.clone(), self.timeout)?;
                tracing::info!("Discord webhook notifications enabled");
                Ok(Some(notifier))
            }
            None => {
                tracing::warn!("No notification channel configured (set DISCORD_WEBHOOK_URL); alerts will only be logged");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = NotificationConfig::from_vars(|_| None);
        assert!(config.webhook_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_from_vars() {
        let env = vars(&[
            ("DISCORD_WEBHOOK_URL", " https://example.com/hook "),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]);
        let config = NotificationConfig::from_vars(|k| env.get(k).cloned());
        assert_eq!(config.webhook_url.as_deref(), Some("https://example.com/hook"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_ignores_blank_url_and_bad_timeout() {
        let env = vars(&[("DISCORD_WEBHOOK_URL", "  "), ("HTTP_TIMEOUT_SECS", "0")]);
        let config = NotificationConfig::from_vars(|k| env.get(k).cloned());
        assert!(config.webhook_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.build_channel().unwrap().is_none());
    }

    #[test]
    fn test_alert_from_trigger() {
        let today = screener_core::DetachmentResult {
            symbol: "MSFT".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            close: 110.0,
            ema: 100.0,
            ratio: 0.1,
            direction: screener_core::Direction::Above,
            state: screener_core::DetachmentState::Detached,
        };
        let alert = Alert::from_trigger(&Trigger::Detached { today }, 200);
        assert_eq!(
            alert,
            Alert::new(
                "MSFT",
                "MSFT is above the 200 EMA by 10.0% (Close: 110.00, EMA200: 100.00)"
            )
        );
    }
}

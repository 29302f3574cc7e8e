use std::sync::Arc;

use notification_service::{Alert, NotificationChannel};
use screener_core::{PriceSource, ScreenerError, Trigger};
use technical_analysis::DetachmentAnalyzer;

use crate::config::ScreenerConfig;

/// Counters for one pass over the ticker list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub alerts: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
    pub skipped_no_data: usize,
    pub skipped_invalid: usize,
}

/// What happened to a single ticker
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Quiet,
    Alerted { message: String, delivered: bool },
    SkippedNoData(String),
    SkippedInvalid(String),
}

pub struct Screener {
    config: ScreenerConfig,
    analyzer: DetachmentAnalyzer,
    source: Arc<dyn PriceSource>,
    channel: Option<Arc<dyn NotificationChannel>>,
}

impl Screener {
    /// `channel: None` runs without delivery; alerts are still logged.
    pub fn new(
        config: ScreenerConfig,
        source: Arc<dyn PriceSource>,
        channel: Option<Arc<dyn NotificationChannel>>,
    ) -> Self {
        let analyzer = DetachmentAnalyzer::new(config.ema_period, config.threshold, config.mode);
        Self {
            config,
            analyzer,
            source,
            channel,
        }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Screen every configured ticker in order.
    ///
    /// Per-ticker failures are logged and counted, never propagated.
    pub async fn run(&self) -> RunSummary {
        tracing::info!(
            "Screening {} tickers via {} (mode={}, ema={}, threshold={}%)",
            self.config.tickers.len(),
            self.source.name(),
            self.analyzer.mode(),
            self.analyzer.period(),
            self.analyzer.threshold() * 100.0
        );

        let mut summary = RunSummary::default();

        for symbol in &self.config.tickers {
            let outcome = self.screen_ticker(symbol).await;
            summary.processed += 1;

            match outcome {
                TickerOutcome::Quiet => {}
                TickerOutcome::Alerted { delivered, .. } => {
                    summary.alerts += 1;
                    if delivered {
                        summary.delivered += 1;
                    } else if self.channel.is_some() {
                        summary.delivery_failures += 1;
                    }
                }
                TickerOutcome::SkippedNoData(_) => summary.skipped_no_data += 1,
                TickerOutcome::SkippedInvalid(_) => summary.skipped_invalid += 1,
            }
        }

        tracing::info!(
            "Screening complete: {} processed, {} alerts ({} delivered, {} failed), {} no data, {} invalid",
            summary.processed,
            summary.alerts,
            summary.delivered,
            summary.delivery_failures,
            summary.skipped_no_data,
            summary.skipped_invalid
        );

        summary
    }

    /// Load, evaluate and (if triggered) deliver for one ticker.
    pub async fn screen_ticker(&self, symbol: &str) -> TickerOutcome {
        let trigger = match self.evaluate(symbol).await {
            Ok(Some(trigger)) => trigger,
            Ok(None) => return TickerOutcome::Quiet,
            Err(ScreenerError::DataUnavailable(reason)) => {
                tracing::info!("No data for {}, skipping: {}", symbol, reason);
                return TickerOutcome::SkippedNoData(reason);
            }
            Err(e) => {
                tracing::info!("Skipping {}: {}", symbol, e);
                return TickerOutcome::SkippedInvalid(e.to_string());
            }
        };

        let alert = Alert::from_trigger(&trigger, self.config.ema_period);
        tracing::info!("{}", alert.message);

        let delivered = self.deliver(&alert).await;
        TickerOutcome::Alerted {
            message: alert.message,
            delivered,
        }
    }

    /// Fetch the series and run the analyzer on it
    pub async fn evaluate(&self, symbol: &str) -> Result<Option<Trigger>, ScreenerError> {
        let series = self
            .source
            .fetch_daily_closes(symbol, self.config.lookback_days)
            .await?;

        if series.len() < self.config.ema_period {
            tracing::debug!(
                "{}: only {} bars for a {}-period EMA",
                symbol,
                series.len(),
                self.config.ema_period
            );
        }

        self.analyzer.analyze(&series)
    }

    async fn deliver(&self, alert: &Alert) -> bool {
        let Some(channel) = self.channel.as_ref() else {
            return false;
        };

        match channel.send(alert).await {
            Ok(status) => {
                tracing::debug!("Sent {} alert via {} ({})", alert.symbol, channel.name(), status);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to send {} alert via {}: {}", alert.symbol, channel.name(), e);
                false
            }
        }
    }
}

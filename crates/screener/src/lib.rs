//! 200 EMA detachment screener.
//!
//! For each configured ticker: load daily closes, compute the EMA, measure how far the
//! latest close sits from it, and post an alert to the webhook when it is detached
//! (every day in absolute mode, only on the breakaway day in transition mode).

pub mod config;
pub mod runner;

pub use config::{ProviderKind, ScreenerConfig, DEFAULT_TICKERS};
pub use runner::{RunSummary, Screener, TickerOutcome};

use market_data::{PolygonClient, YahooChartClient};
use screener_core::{PriceSource, ScreenerError};
use std::sync::Arc;

/// Build the configured market data provider.
pub fn build_price_source(config: &ScreenerConfig) -> Result<Arc<dyn PriceSource>, ScreenerError> {
    let timeout = config.http_timeout;
    let source: Arc<dyn PriceSource> = match config.provider {
        ProviderKind::Yahoo => Arc::new(YahooChartClient::new(timeout)?),
        ProviderKind::Polygon { ref api_key } => Arc::new(PolygonClient::new(api_key.clone(), timeout)?),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_price_source_per_provider() {
        let config = ScreenerConfig {
            http_timeout: Duration::from_secs(5),
            ..ScreenerConfig::default()
        };
        assert_eq!(build_price_source(&config).unwrap().name(), "yahoo");

        let config = ScreenerConfig {
            provider: ProviderKind::Polygon { api_key: "key".to_string() },
            ..config
        };
        assert_eq!(build_price_source(&config).unwrap().name(), "polygon");
    }
}

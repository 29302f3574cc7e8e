use async_trait::async_trait;
use crate::{PriceSeries, ScreenerError};

/// Trait for daily price history providers
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch daily closes covering the last `lookback_days` calendar days.
    ///
    /// An empty response is reported as `ScreenerError::DataUnavailable`, never as
    /// an empty series, so callers can skip the symbol and move on.
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, ScreenerError>;

    fn name(&self) -> &str;
}

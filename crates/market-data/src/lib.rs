//! Daily close loaders for the screener.
//!
//! Two providers implement `screener_core::PriceSource`: the Yahoo Finance chart API
//! (no key required) and Polygon aggregates (needs `POLYGON_API_KEY`). Both report
//! every failure, including an empty response, as `ScreenerError::DataUnavailable`.

mod polygon;
mod yahoo;

pub use polygon::PolygonClient;
pub use yahoo::YahooChartClient;

use reqwest::Client;
use screener_core::ScreenerError;
use std::time::Duration;

/// Calendar days requested by default (roughly 250 trading sessions).
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, ScreenerError> {
    Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .timeout(timeout)
        .build()
        .map_err(|e| ScreenerError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a non-success response into `DataUnavailable` with the status and body.
pub(crate) async fn ensure_success(
    symbol: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ScreenerError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(ScreenerError::DataUnavailable(format!(
        "{}: HTTP {}: {}",
        symbol,
        response.status(),
        response.text().await.unwrap_or_default()
    )))
}

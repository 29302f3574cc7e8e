use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use screener_core::{PricePoint, PriceSeries, PriceSource, ScreenerError};
use serde::Deserialize;
use std::time::Duration;

use crate::{build_http_client, ensure_success};

const BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Yahoo Finance v8 chart endpoint client.
#[derive(Clone)]
pub struct YahooChartClient {
    base_url: String,
    client: Client,
}

impl YahooChartClient {
    pub fn new(timeout: Duration) -> Result<Self, ScreenerError> {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ScreenerError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_http_client(timeout)?,
        })
    }

    /// Get daily closes between `from` and `to`.
    ///
    /// Prefers the split/dividend adjusted close column and falls back to the raw
    /// close when the provider omits it.
    pub async fn get_daily_closes(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PriceSeries, ScreenerError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, yahoo_symbol(symbol));

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", from.timestamp().to_string()),
                ("period2", to.timestamp().to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ScreenerError::DataUnavailable(format!("{}: {}", symbol, e)))?;

        let response = ensure_success(symbol, response).await?;

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| ScreenerError::DataUnavailable(format!("{}: {}", symbol, e)))?;

        if let Some(err) = chart.chart.error {
            return Err(ScreenerError::DataUnavailable(format!(
                "{}: {} ({})",
                symbol, err.description, err.code
            )));
        }

        let result = chart
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ScreenerError::DataUnavailable(format!("{}: no chart data found", symbol)))?;

        let closes = result
            .indicators
            .adjclose
            .into_iter()
            .next()
            .map(|a| a.adjclose)
            .filter(|c| !c.is_empty())
            .or_else(|| result.indicators.quote.into_iter().next().map(|q| q.close))
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ScreenerError::DataUnavailable(format!("{}: no close prices", symbol)))?;

        let gmtoffset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let points: Vec<PricePoint> = result
            .timestamp
            .iter()
            .zip(closes.iter())
            .filter_map(|(&ts, close)| {
                let close = (*close)?;
                let date = DateTime::from_timestamp(ts + gmtoffset, 0)?.date_naive();
                Some(PricePoint::new(date, close))
            })
            .collect();

        tracing::debug!("Yahoo {}: {} daily rows", symbol, points.len());

        PriceSeries::from_points(symbol, points)
    }
}

#[async_trait]
impl PriceSource for YahooChartClient {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, ScreenerError> {
        let to = Utc::now();
        let from = to - ChronoDuration::days(lookback_days as i64);
        self.get_daily_closes(symbol, from, to).await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Yahoo writes share classes with a dash (`BRK-B`).
fn yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

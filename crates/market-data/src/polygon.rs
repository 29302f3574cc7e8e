use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Client;
use screener_core::{PricePoint, PriceSeries, PriceSource, ScreenerError};
use serde::Deserialize;
use std::time::Duration;

use crate::{build_http_client, ensure_success};

const BASE_URL: &str = "https://api.polygon.io";

/// Polygon aggregates client, daily bars only.
#[derive(Clone)]
pub struct PolygonClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl PolygonClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ScreenerError> {
        Self::with_base_url(api_key, BASE_URL, timeout)
    }

    pub fn with_base_url(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ScreenerError> {
        if api_key.trim().is_empty() {
            return Err(ScreenerError::Config("POLYGON_API_KEY is empty".to_string()));
        }
        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_http_client(timeout)?,
        })
    }

    /// Get adjusted daily closes between two dates (inclusive)
    pub async fn get_daily_closes(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, ScreenerError> {
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
            self.base_url,
            symbol,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "50000"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ScreenerError::DataUnavailable(format!("{}: {}", symbol, e)))?;

        let response = ensure_success(symbol, response).await?;

        let agg_response: AggregateResponse = response
            .json()
            .await
            .map_err(|e| ScreenerError::DataUnavailable(format!("{}: {}", symbol, e)))?;

        let points: Vec<PricePoint> = agg_response
            .results
            .into_iter()
            .filter_map(|r| {
                let date = DateTime::from_timestamp_millis(r.t)?.date_naive();
                Some(PricePoint::new(date, r.c?))
            })
            .collect();

        tracing::debug!("Polygon {}: {} daily rows", symbol, points.len());

        PriceSeries::from_points(symbol, points)
    }
}

#[async_trait]
impl PriceSource for PolygonClient {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, ScreenerError> {
        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(lookback_days as i64);
        self.get_daily_closes(symbol, from, to).await
    }

    fn name(&self) -> &str {
        "polygon"
    }
}

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    results: Vec<AggregateResult>,
}

#[derive(Debug, Deserialize)]
struct AggregateResult {
    t: i64, // timestamp (ms)
    #[serde(default)]
    c: Option<f64>, // close
}

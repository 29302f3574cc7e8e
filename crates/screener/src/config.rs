use market_data::DEFAULT_LOOKBACK_DAYS;
use notification_service::NotificationConfig;
use screener_core::{EvaluationMode, ScreenerError};
use std::time::Duration;
use technical_analysis::{DEFAULT_DETACH_THRESHOLD, DEFAULT_EMA_PERIOD};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_TICKERS: &[&str] = &[
    "AAPL", "AMD", "AMZN", "AVGO", "BABA", "BRK.B", "COST", "CRWV", "GOOGL",
    "JNJ", "JPM", "KO", "LLY", "META", "MSFT", "NFLX", "NVDA", "ORCL", "PG",
    "PLTR", "QQQ", "RDDT", "SPY", "TSLA", "TSM", "UNH", "V", "WMT", "XOM",
];

/// Where daily closes come from
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderKind {
    Yahoo,
    Polygon { api_key: String },
}

/// Everything one screener run needs. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    pub tickers: Vec<String>,
    /// Detachment ratio above which a close counts as detached (0.0001 = 0.01%)
    pub threshold: f64,
    pub ema_period: usize,
    /// Calendar days of history to request
    pub lookback_days: u32,
    pub mode: EvaluationMode,
    pub provider: ProviderKind,
    /// Request timeout for the market data client
    pub http_timeout: Duration,
    pub notification: NotificationConfig,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect(),
            threshold: DEFAULT_DETACH_THRESHOLD,
            ema_period: DEFAULT_EMA_PERIOD,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            mode: EvaluationMode::Absolute,
            provider: ProviderKind::Yahoo,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            notification: NotificationConfig::default(),
        }
    }
}

impl ScreenerConfig {
    /// Load from environment variables (call `dotenvy::dotenv()` first to pick up `.env`).
    pub fn from_env() -> Result<Self, ScreenerError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Unset variables keep their defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ScreenerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tickers = match get("SCREENER_TICKERS") {
            Some(list) => {
                let tickers: Vec<String> = list
                    .split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect();
                if tickers.is_empty() {
                    defaults.tickers.clone()
                } else {
                    tickers
                }
            }
            None => defaults.tickers.clone(),
        };

        let threshold = parse_or_default(get("DETACH_THRESHOLD"), "DETACH_THRESHOLD", defaults.threshold, |v: &f64| {
            v.is_finite() && *v >= 0.0
        });
        let ema_period = parse_or_default(get("EMA_PERIOD"), "EMA_PERIOD", defaults.ema_period, |v: &usize| *v > 0);
        let lookback_days =
            parse_or_default(get("LOOKBACK_DAYS"), "LOOKBACK_DAYS", defaults.lookback_days, |v: &u32| *v > 0);
        let http_timeout_secs =
            parse_or_default(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS, |v: &u64| *v > 0);

        let mode = match get("SCREENER_MODE") {
            Some(mode) => mode.parse::<EvaluationMode>()?,
            None => defaults.mode,
        };

        let provider = match get("MARKET_DATA_PROVIDER").map(|p| p.to_ascii_lowercase()) {
            None => ProviderKind::Yahoo,
            Some(p) if p == "yahoo" => ProviderKind::Yahoo,
            Some(p) if p == "polygon" => {
                let api_key = get("POLYGON_API_KEY").ok_or_else(|| {
                    ScreenerError::Config("POLYGON_API_KEY must be set when MARKET_DATA_PROVIDER=polygon".to_string())
                })?;
                ProviderKind::Polygon { api_key }
            }
            Some(other) => {
                return Err(ScreenerError::Config(format!(
                    "unknown MARKET_DATA_PROVIDER '{}' (expected 'yahoo' or 'polygon')",
                    other
                )))
            }
        };

        Ok(Self {
            tickers,
            threshold,
            ema_period,
            lookback_days,
            mode,
            provider,
            http_timeout: Duration::from_secs(http_timeout_secs),
            notification: NotificationConfig::from_vars(&lookup),
        })
    }
}

fn parse_or_default<T, P>(raw: Option<String>, key: &str, default: T, valid: P) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
    P: Fn(&T) -> bool,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            tracing::warn!("Ignoring invalid {}='{}', using {}", key, raw, default);
            default
        }
    }
}

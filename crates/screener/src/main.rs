//! screener: one pass over the watchlist, alerting on 200 EMA detachment.
//!
//! Configuration comes from the environment (or a `.env` file):
//!   DISCORD_WEBHOOK_URL   webhook to post alerts to (unset: log only)
//!   SCREENER_TICKERS      comma separated symbols (default: built-in list)
//!   SCREENER_MODE         absolute | transition
//!   DETACH_THRESHOLD      ratio, default 0.0001 (0.01%)
//!   MARKET_DATA_PROVIDER  yahoo | polygon (needs POLYGON_API_KEY)

use notification_service::NotificationChannel;
use screener::{build_price_source, Screener, ScreenerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screener=info,market_data=warn,notification_service=info".into()),
        )
        .init();

    let config = ScreenerConfig::from_env()?;
    let source = build_price_source(&config)?;
    let channel = config
        .notification
        .build_channel()?
        .map(|notifier| Arc::new(notifier) as Arc<dyn NotificationChannel>);

    let screener = Screener::new(config, source, channel);
    let summary = screener.run().await;

    if summary.delivery_failures > 0 {
        tracing::warn!("{} alerts could not be delivered", summary.delivery_failures);
    }

    Ok(())
}

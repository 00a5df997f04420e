//! Polygon.io feed integration.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use desk_core::error::FeedError;
use desk_core::traits::MarketFeed;
use desk_core::types::{FeedPlan, MarketSnapshot};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

const BASE_URL: &str = "https://api.polygon.io";

/// Polygon API configuration.
#[derive(Debug, Clone)]
pub struct PolygonConfig {
    pub api_key: String,
    pub plan: FeedPlan,
}

impl PolygonConfig {
    /// Create config directly with a key and plan.
    pub fn new(api_key: String, plan: FeedPlan) -> Self {
        Self { api_key, plan }
    }

    /// Load from environment variables. Returns `None` when no key is set,
    /// which callers treat as "run without a live feed".
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("POLYGON_API_KEY").ok()?;
        let plan = match std::env::var("POLYGON_PLAN").as_deref() {
            Ok("paid") | Ok("realtime") | Ok("intraday") => FeedPlan::Intraday,
            _ => FeedPlan::EndOfDay,
        };
        Some(Self { api_key, plan })
    }
}

/// Polygon API response types
#[derive(Debug, Deserialize)]
struct MarketStatus {
    market: String,
}

#[derive(Debug, Deserialize)]
struct PrevCloseResponse {
    #[serde(default)]
    results: Vec<PrevCloseBar>,
}

#[derive(Debug, Deserialize)]
struct PrevCloseBar {
    /// Bar timestamp in Unix milliseconds
    t: i64,
}

#[derive(Debug, Deserialize)]
struct GroupedDailyResponse {
    #[serde(default)]
    results: Vec<GroupedDailyBar>,
}

#[derive(Debug, Deserialize)]
struct GroupedDailyBar {
    #[serde(rename = "T")]
    ticker: String,
    /// Closing price
    c: f64,
}

#[derive(Debug, Deserialize)]
struct TickerSnapshotResponse {
    ticker: TickerSnapshot,
}

#[derive(Debug, Deserialize)]
struct TickerSnapshot {
    min: MinuteBar,
}

#[derive(Debug, Deserialize)]
struct MinuteBar {
    c: f64,
}

/// Market feed backed by the Polygon REST API.
pub struct PolygonFeed {
    config: PolygonConfig,
    client: Client,
}

impl PolygonFeed {
    pub fn new(config: PolygonConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FeedError> {
        let url = format!("{}{}", BASE_URL, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Api(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))
    }

    /// Date of the most recent completed session, probed from SPY's
    /// previous-close bar.
    async fn last_session_date(&self) -> Result<NaiveDate, FeedError> {
        let probe: PrevCloseResponse = self.get_json("/v2/aggs/ticker/SPY/prev?adjusted=true").await?;
        let bar = probe
            .results
            .first()
            .ok_or_else(|| FeedError::Api("empty previous-close probe".into()))?;
        let timestamp = DateTime::from_timestamp_millis(bar.t)
            .ok_or_else(|| FeedError::Parse(format!("bad bar timestamp {}", bar.t)))?;
        Ok(timestamp.date_naive())
    }

    fn to_decimal(value: f64) -> Result<Decimal, FeedError> {
        Decimal::try_from(value).map_err(|e| FeedError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MarketFeed for PolygonFeed {
    async fn is_open(&self) -> Result<bool, FeedError> {
        let status: MarketStatus = self.get_json("/v1/marketstatus/now").await?;
        Ok(status.market == "open")
    }

    /// Build the whole market's closing-price table. The table always comes
    /// from the most recent completed session, which may be earlier than the
    /// requested date over weekends and holidays.
    async fn end_of_day(&self, date: NaiveDate) -> Result<MarketSnapshot, FeedError> {
        let session = self.last_session_date().await?;
        debug!(%date, %session, "building end-of-day snapshot");

        let grouped: GroupedDailyResponse = self
            .get_json(&format!(
                "/v2/aggs/grouped/locale/us/market/stocks/{}?adjusted=true&include_otc=false",
                session.format("%Y-%m-%d")
            ))
            .await?;

        let mut snapshot = MarketSnapshot::with_capacity(grouped.results.len());
        for bar in grouped.results {
            snapshot.insert(bar.ticker, Self::to_decimal(bar.c)?);
        }
        Ok(snapshot)
    }

    async fn intraday(&self, symbol: &str) -> Result<Decimal, FeedError> {
        let response: TickerSnapshotResponse = self
            .get_json(&format!(
                "/v2/snapshot/locale/us/markets/stocks/tickers/{}",
                symbol
            ))
            .await?;
        Self::to_decimal(response.ticker.min.c)
    }

    fn plan(&self) -> FeedPlan {
        self.config.plan
    }

    fn name(&self) -> &str {
        "polygon"
    }
}

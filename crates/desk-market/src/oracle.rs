//! Price oracle with tiered fallback.

use chrono::Utc;
use desk_core::error::FeedError;
use desk_core::traits::{AuditLog, LogCategory, MarketFeed, SnapshotStore};
use desk_core::types::{FeedPlan, MarketSnapshot};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for live fetches.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Retries after the first attempt (2 means 3 attempts total)
    pub retries: u32,
    /// Fixed pause between attempts
    pub backoff: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(100),
        }
    }
}

/// Where a resolved price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriceSource {
    Live,
    LastKnown,
    Snapshot,
    Unpriced,
}

/// Resolves a symbol's price for "now", degrading to cached or synthetic
/// data rather than failing.
///
/// The resolution chain is tried in order: live feed (with bounded
/// retries), last-known-good in-process cache, today's persisted snapshot,
/// and finally zero. A price lookup must never crash a trade; staleness is
/// preferable to failure, but recency is preferred over staleness.
pub struct PriceOracle {
    feed: Option<Arc<dyn MarketFeed>>,
    snapshots: Arc<dyn SnapshotStore>,
    audit: Arc<dyn AuditLog>,
    config: OracleConfig,
    /// Last successful price per symbol, overwritten on every live fetch
    last_known: RwLock<HashMap<String, Decimal>>,
    /// Today's snapshot, built at most once per calendar date. The async
    /// mutex makes concurrent first lookups wait instead of fetching twice.
    daily: tokio::sync::Mutex<Option<(chrono::NaiveDate, Arc<MarketSnapshot>)>>,
}

impl PriceOracle {
    /// Create an oracle. `feed` is `None` when no credential is configured,
    /// in which case only the cache tiers are consulted.
    pub fn new(
        feed: Option<Arc<dyn MarketFeed>>,
        snapshots: Arc<dyn SnapshotStore>,
        audit: Arc<dyn AuditLog>,
        config: OracleConfig,
    ) -> Self {
        Self {
            feed,
            snapshots,
            audit,
            config,
            last_known: RwLock::new(HashMap::new()),
            daily: tokio::sync::Mutex::new(None),
        }
    }

    /// Resolve the current price for a symbol. Never fails outward: upstream
    /// errors are retried, then absorbed into the cache fallbacks, with zero
    /// as the terminal value.
    pub async fn price(&self, symbol: &str) -> Decimal {
        let (price, source) = self.resolve(symbol).await;
        debug!(symbol, %price, ?source, "price resolved");
        price
    }

    async fn resolve(&self, symbol: &str) -> (Decimal, PriceSource) {
        if let Some(feed) = self.feed.clone() {
            if let Some(price) = self.live_price(feed.as_ref(), symbol).await {
                self.last_known
                    .write()
                    .unwrap()
                    .insert(symbol.to_string(), price);
                return (price, PriceSource::Live);
            }
        }

        if let Some(price) = self.last_known.read().unwrap().get(symbol) {
            return (*price, PriceSource::LastKnown);
        }

        if let Some(price) = self.persisted_price(symbol).await {
            return (price, PriceSource::Snapshot);
        }

        (Decimal::ZERO, PriceSource::Unpriced)
    }

    /// Attempt the live path with bounded retries. Returns `None` once every
    /// attempt has failed.
    async fn live_price(&self, feed: &dyn MarketFeed, symbol: &str) -> Option<Decimal> {
        for attempt in 0..=self.config.retries {
            match self.fetch(feed, symbol).await {
                Ok(price) => return Some(price),
                Err(err) => {
                    warn!(symbol, attempt, error = %err, "market feed fetch failed");
                    self.audit
                        .record(
                            "market",
                            LogCategory::Error,
                            &format!("{} error: {}", feed.name(), err),
                        )
                        .await;
                    if attempt < self.config.retries {
                        tokio::time::sleep(self.config.backoff).await;
                    }
                }
            }
        }
        None
    }

    async fn fetch(&self, feed: &dyn MarketFeed, symbol: &str) -> Result<Decimal, FeedError> {
        match feed.plan() {
            FeedPlan::Intraday => feed.intraday(symbol).await,
            FeedPlan::EndOfDay => {
                let snapshot = self.daily_snapshot(feed).await?;
                Ok(snapshot.get(symbol).copied().unwrap_or(Decimal::ZERO))
            }
        }
    }

    /// Today's market-wide snapshot: reused if already built for this date,
    /// loaded from the snapshot store if persisted by an earlier run, and
    /// otherwise fetched from the feed exactly once and persisted.
    async fn daily_snapshot(&self, feed: &dyn MarketFeed) -> Result<Arc<MarketSnapshot>, FeedError> {
        let today = Utc::now().date_naive();
        let mut slot = self.daily.lock().await;

        if let Some((date, snapshot)) = slot.as_ref() {
            if *date == today {
                return Ok(snapshot.clone());
            }
        }

        match self.snapshots.read(today).await {
            Ok(Some(snapshot)) => {
                let snapshot = Arc::new(snapshot);
                *slot = Some((today, snapshot.clone()));
                return Ok(snapshot);
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "snapshot store read failed"),
        }

        let snapshot = feed.end_of_day(today).await?;
        if let Err(err) = self.snapshots.write(today, &snapshot).await {
            // Lookups can still be served from the in-memory slot.
            warn!(error = %err, "snapshot store write failed");
        }

        let snapshot = Arc::new(snapshot);
        *slot = Some((today, snapshot.clone()));
        Ok(snapshot)
    }

    /// Cache-tier fallback: today's persisted snapshot. A hit is promoted
    /// into the in-process cache.
    async fn persisted_price(&self, symbol: &str) -> Option<Decimal> {
        let today = Utc::now().date_naive();
        match self.snapshots.read(today).await {
            Ok(Some(snapshot)) => {
                let price = snapshot.get(symbol).copied()?;
                self.last_known
                    .write()
                    .unwrap()
                    .insert(symbol.to_string(), price);
                Some(price)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "snapshot store read failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use desk_store::MemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAudit {
        errors: AtomicUsize,
    }

    impl CountingAudit {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                errors: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AuditLog for CountingAudit {
        async fn record(&self, _name: &str, category: LogCategory, _message: &str) {
            if category == LogCategory::Error {
                self.errors.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Feed that fails every call.
    struct FailingFeed {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketFeed for FailingFeed {
        async fn is_open(&self) -> Result<bool, FeedError> {
            Err(FeedError::Network("down".into()))
        }

        async fn end_of_day(&self, _date: NaiveDate) -> Result<MarketSnapshot, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FeedError::Network("down".into()))
        }

        async fn intraday(&self, _symbol: &str) -> Result<Decimal, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FeedError::Network("down".into()))
        }

        fn plan(&self) -> FeedPlan {
            FeedPlan::Intraday
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// End-of-day feed that serves a fixed table and counts fetches.
    struct EodFeed {
        fetches: AtomicUsize,
        table: MarketSnapshot,
    }

    #[async_trait]
    impl MarketFeed for EodFeed {
        async fn is_open(&self) -> Result<bool, FeedError> {
            Ok(false)
        }

        async fn end_of_day(&self, _date: NaiveDate) -> Result<MarketSnapshot, FeedError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.table.clone())
        }

        async fn intraday(&self, _symbol: &str) -> Result<Decimal, FeedError> {
            Err(FeedError::NotConfigured)
        }

        fn plan(&self) -> FeedPlan {
            FeedPlan::EndOfDay
        }

        fn name(&self) -> &str {
            "eod"
        }
    }

    /// Intraday feed that succeeds a fixed number of times, then fails.
    struct FlakyFeed {
        remaining: AtomicUsize,
        price: Decimal,
    }

    #[async_trait]
    impl MarketFeed for FlakyFeed {
        async fn is_open(&self) -> Result<bool, FeedError> {
            Ok(true)
        }

        async fn end_of_day(&self, _date: NaiveDate) -> Result<MarketSnapshot, FeedError> {
            Err(FeedError::NotConfigured)
        }

        async fn intraday(&self, _symbol: &str) -> Result<Decimal, FeedError> {
            if self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                Ok(self.price)
            } else {
                Err(FeedError::Api("quota exhausted".into()))
            }
        }

        fn plan(&self) -> FeedPlan {
            FeedPlan::Intraday
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn fast_config() -> OracleConfig {
        OracleConfig {
            retries: 2,
            backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_failing_feed_never_errors_and_logs_each_attempt() {
        let feed = Arc::new(FailingFeed {
            calls: AtomicUsize::new(0),
        });
        let audit = CountingAudit::new();
        let oracle = PriceOracle::new(
            Some(feed.clone()),
            Arc::new(MemoryStore::new()),
            audit.clone(),
            fast_config(),
        );

        let price = oracle.price("AAPL").await;

        assert_eq!(price, Decimal::ZERO);
        assert!(price >= Decimal::ZERO);
        // 2 retries after the first attempt: 3 attempts, one error log each
        assert_eq!(feed.calls.load(Ordering::SeqCst), 3);
        assert_eq!(audit.errors.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_eod_snapshot_fetched_once_per_date() {
        let feed = Arc::new(EodFeed {
            fetches: AtomicUsize::new(0),
            table: MarketSnapshot::from([
                ("AAPL".to_string(), dec!(150)),
                ("MSFT".to_string(), dec!(300)),
            ]),
        });
        let store = Arc::new(MemoryStore::new());
        let oracle = PriceOracle::new(
            Some(feed.clone()),
            store.clone(),
            CountingAudit::new(),
            fast_config(),
        );

        assert_eq!(oracle.price("AAPL").await, dec!(150));
        assert_eq!(oracle.price("MSFT").await, dec!(300));
        assert_eq!(oracle.price("GOOG").await, Decimal::ZERO);

        assert_eq!(feed.fetches.load(Ordering::SeqCst), 1);

        // The snapshot was also persisted for later runs.
        let today = Utc::now().date_naive();
        let persisted = SnapshotStore::read(store.as_ref(), today).await.unwrap();
        assert_eq!(persisted.unwrap().get("AAPL"), Some(&dec!(150)));
    }

    #[tokio::test]
    async fn test_live_failure_falls_back_to_last_known() {
        let feed = Arc::new(FlakyFeed {
            remaining: AtomicUsize::new(1),
            price: dec!(123.45),
        });
        let oracle = PriceOracle::new(
            Some(feed),
            Arc::new(MemoryStore::new()),
            CountingAudit::new(),
            fast_config(),
        );

        // First lookup succeeds live and seeds the cache.
        assert_eq!(oracle.price("NVDA").await, dec!(123.45));
        // The feed is now dead; the cached price is served instead.
        assert_eq!(oracle.price("NVDA").await, dec!(123.45));
    }

    #[tokio::test]
    async fn test_no_feed_falls_back_to_persisted_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let today = Utc::now().date_naive();
        let snapshot = MarketSnapshot::from([("AAPL".to_string(), dec!(99))]);
        SnapshotStore::write(store.as_ref(), today, &snapshot)
            .await
            .unwrap();

        let oracle = PriceOracle::new(None, store, CountingAudit::new(), fast_config());

        assert_eq!(oracle.price("AAPL").await, dec!(99));
        // Unknown symbols terminate at zero.
        assert_eq!(oracle.price("ZZZZ").await, Decimal::ZERO);
    }
}

//! CLI command implementations.

pub mod report;
pub mod simulate;
pub mod store_server;
pub mod validate;

use anyhow::Result;
use desk_config::AppConfig;
use desk_core::traits::MarketFeed;
use desk_ledger::Desk;
use desk_market::{OracleConfig, PolygonConfig, PolygonFeed, PriceOracle};
use desk_store::JsonStore;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Wire a desk from configuration: JSON store, optional Polygon feed,
/// oracle, and ledger all share the same store and audit sink.
pub fn build_desk(config: &AppConfig) -> (Desk, Arc<JsonStore>, Option<Arc<dyn MarketFeed>>) {
    let store = Arc::new(JsonStore::new(config.store.root.clone()));

    let feed = config.market.api_key().map(|api_key| {
        let plan = config.market.plan;
        info!(%plan, "live market feed configured");
        Arc::new(PolygonFeed::new(PolygonConfig::new(api_key, plan))) as Arc<dyn MarketFeed>
    });
    if feed.is_none() {
        info!("no feed credential set, running from cached prices");
    }

    let oracle = Arc::new(PriceOracle::new(
        feed.clone(),
        store.clone(),
        store.clone(),
        OracleConfig {
            retries: config.market.retries,
            backoff: Duration::from_millis(config.market.backoff_ms),
        },
    ));

    let desk = Desk::new(config.limits.clone(), oracle, store.clone(), store.clone());
    (desk, store, feed)
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    desk_config::load_config(path).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
}

/// Parse a `SYMBOL=PRICE` seed pair.
pub fn parse_seed(pair: &str) -> Result<(String, rust_decimal::Decimal)> {
    let (symbol, price) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected SYMBOL=PRICE, got {pair:?}"))?;
    Ok((symbol.trim().to_uppercase(), price.trim().parse()?))
}

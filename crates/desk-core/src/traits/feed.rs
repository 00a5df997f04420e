//! Market feed trait definition.

use crate::error::FeedError;
use crate::types::{FeedPlan, MarketSnapshot};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Trait for upstream market-data providers.
///
/// Any of these calls may fail; the price oracle absorbs failures with
/// retries and cache fallbacks, so implementations should surface errors
/// honestly rather than papering over them.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Check whether the market is currently open.
    async fn is_open(&self) -> Result<bool, FeedError>;

    /// Fetch the market-wide end-of-day price table for a date.
    ///
    /// # Arguments
    /// * `date` - The calendar date the snapshot is being built for
    async fn end_of_day(&self, date: NaiveDate) -> Result<MarketSnapshot, FeedError>;

    /// Fetch the current intraday price for a single symbol.
    async fn intraday(&self, symbol: &str) -> Result<Decimal, FeedError>;

    /// Which kind of data this feed's subscription provides.
    fn plan(&self) -> FeedPlan;

    /// Get the feed name.
    fn name(&self) -> &str;
}

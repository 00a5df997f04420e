//! Market snapshot types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Market-wide end-of-day price table for a single calendar date.
///
/// Once computed for a date the snapshot is immutable and reused for every
/// symbol lookup for the remainder of that date.
pub type MarketSnapshot = HashMap<String, Decimal>;

/// Which kind of price data the configured feed subscription provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedPlan {
    /// End-of-day grouped prices only; intraday lookups resolve against
    /// the daily snapshot.
    #[default]
    #[serde(rename = "eod")]
    EndOfDay,
    /// Per-symbol intraday prices are available.
    Intraday,
}

impl std::fmt::Display for FeedPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedPlan::EndOfDay => write!(f, "eod"),
            FeedPlan::Intraday => write!(f, "intraday"),
        }
    }
}

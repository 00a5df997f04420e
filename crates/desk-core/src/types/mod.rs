//! Core data types for the trading desk.

mod account;
mod market;

pub use account::{Account, AccountReport, Transaction, ValuationPoint};
pub use market::{FeedPlan, MarketSnapshot};

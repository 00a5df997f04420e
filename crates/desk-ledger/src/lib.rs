//! Account ledger for the trading desk.
//!
//! Owns balances, holdings, and transaction history per named trader,
//! enforces order-size and daily-trade limits, and serializes mutating
//! operations per account name.

mod ledger;
mod limits;

pub use ledger::Desk;
pub use limits::TradeLimits;

//! Error types for the trading desk.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level desk error.
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Ledger precondition and persistence errors.
///
/// Every variant except `Store` is a synchronous precondition failure: the
/// account has not been mutated or persisted when one is returned.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Quantity must be a positive number of shares, got {0}")]
    InvalidQuantity(i64),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Order size {quantity} exceeds maximum of {max} shares")]
    OrderTooLarge { quantity: i64, max: i64 },

    #[error("Daily trade limit of {limit} reached")]
    DailyLimitReached { limit: u32 },

    #[error("Trade value {notional} exceeds risk limit of {limit}")]
    TradeLimitExceeded { notional: Decimal, limit: Decimal },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Cannot sell {requested} shares of {symbol}: only {held} held")]
    InsufficientShares {
        symbol: String,
        requested: i64,
        held: i64,
    },

    #[error("Unrecognized symbol: {0}")]
    UnknownSymbol(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Persistence layer errors. Fatal to the operation that hit them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Market feed errors. Absorbed by the oracle, never surfaced to the ledger.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("No feed credential configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for desk operations.
pub type DeskResult<T> = Result<T, DeskError>;

//! Store trait definitions.
//!
//! The ledger and oracle treat persistence as opaque key-value contracts:
//! no transactional semantics are assumed beyond atomicity of a single
//! read or write.

use crate::error::StoreError;
use crate::types::{Account, MarketSnapshot};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Keyed storage for account records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Load an account by lowercase name, or `None` if never persisted.
    async fn read(&self, name: &str) -> Result<Option<Account>, StoreError>;

    /// Persist an account record, replacing any previous version.
    async fn write(&self, account: &Account) -> Result<(), StoreError>;
}

/// Keyed storage for per-date market snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot for a calendar date, or `None` if not yet built.
    async fn read(&self, date: NaiveDate) -> Result<Option<MarketSnapshot>, StoreError>;

    /// Persist the snapshot for a calendar date.
    async fn write(&self, date: NaiveDate, snapshot: &MarketSnapshot) -> Result<(), StoreError>;
}

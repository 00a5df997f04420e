//! In-memory store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use desk_core::error::StoreError;
use desk_core::traits::{AccountStore, AuditLog, LogCategory, SnapshotStore};
use desk_core::types::{Account, MarketSnapshot};
use std::collections::HashMap;
use std::sync::RwLock;

/// A recorded audit entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub category: LogCategory,
    pub message: String,
}

/// Process-local store backing every capability trait.
///
/// Safe under concurrent access from multiple accounts' operations; each
/// map is guarded by its own lock.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, Account>>,
    snapshots: RwLock<HashMap<NaiveDate, MarketSnapshot>>,
    logs: RwLock<Vec<LogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the snapshot for a date. Test convenience.
    pub fn seed_snapshot(&self, date: NaiveDate, snapshot: MarketSnapshot) {
        self.snapshots.write().unwrap().insert(date, snapshot);
    }

    /// All audit entries recorded so far.
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.logs.read().unwrap().clone()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn read(&self, name: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().unwrap().get(name).cloned())
    }

    async fn write(&self, account: &Account) -> Result<(), StoreError> {
        self.accounts
            .write()
            .unwrap()
            .insert(account.name.clone(), account.clone());
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn read(&self, date: NaiveDate) -> Result<Option<MarketSnapshot>, StoreError> {
        Ok(self.snapshots.read().unwrap().get(&date).cloned())
    }

    async fn write(&self, date: NaiveDate, snapshot: &MarketSnapshot) -> Result<(), StoreError> {
        self.snapshots
            .write()
            .unwrap()
            .insert(date, snapshot.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn record(&self, name: &str, category: LogCategory, message: &str) {
        self.logs.write().unwrap().push(LogEntry {
            timestamp: Utc::now(),
            name: name.to_string(),
            category,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_account_round_trip() {
        let store = MemoryStore::new();
        assert!(AccountStore::read(&store, "alice").await.unwrap().is_none());

        let account = Account::new("alice", dec!(10000));
        AccountStore::write(&store, &account).await.unwrap();

        let loaded = AccountStore::read(&store, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.name, "alice");
        assert_eq!(loaded.balance, dec!(10000));
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let store = MemoryStore::new();
        let date = Utc::now().date_naive();
        let snapshot = MarketSnapshot::from([("AAPL".to_string(), dec!(150))]);

        SnapshotStore::write(&store, date, &snapshot).await.unwrap();
        let loaded = SnapshotStore::read(&store, date).await.unwrap().unwrap();
        assert_eq!(loaded.get("AAPL"), Some(&dec!(150)));
    }

    #[tokio::test]
    async fn test_audit_entries_recorded() {
        let store = MemoryStore::new();
        store.record("alice", LogCategory::Risk, "rejected").await;
        store.record("alice", LogCategory::Audit, "bought").await;

        let entries = store.log_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, LogCategory::Risk);
    }
}

//! JSON-on-disk store.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use desk_core::error::StoreError;
use desk_core::traits::{AccountStore, AuditLog, LogCategory, SnapshotStore};
use desk_core::types::{Account, MarketSnapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Store backed by a directory of JSON documents.
///
/// One file per key: `accounts/<name>.json`, `market/<date>.json`, and
/// `logs/<name>.jsonl` for appended audit lines. Writes go through a
/// temp-file rename, so a single read or write is atomic; nothing beyond
/// that is guaranteed.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn account_path(&self, name: &str) -> PathBuf {
        self.root.join("accounts").join(format!("{}.json", name))
    }

    fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join("market")
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    fn log_path(&self, name: &str) -> PathBuf {
        self.root.join("logs").join(format!("{}.jsonl", name))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn append_log(&self, name: &str, category: LogCategory, message: &str) -> Result<(), StoreError> {
        let path = self.log_path(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let line = serde_json::json!({
            "timestamp": Utc::now(),
            "category": category,
            "message": message,
        });

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for JsonStore {
    async fn read(&self, name: &str) -> Result<Option<Account>, StoreError> {
        Self::read_json(&self.account_path(name)).await
    }

    async fn write(&self, account: &Account) -> Result<(), StoreError> {
        Self::write_json(&self.account_path(&account.name), account).await
    }
}

#[async_trait]
impl SnapshotStore for JsonStore {
    async fn read(&self, date: NaiveDate) -> Result<Option<MarketSnapshot>, StoreError> {
        Self::read_json(&self.snapshot_path(date)).await
    }

    async fn write(&self, date: NaiveDate, snapshot: &MarketSnapshot) -> Result<(), StoreError> {
        Self::write_json(&self.snapshot_path(date), snapshot).await
    }
}

#[async_trait]
impl AuditLog for JsonStore {
    /// Append an audit line. Failures are logged and swallowed: the audit
    /// log is fire-and-forget and must never abort a trading operation.
    async fn record(&self, name: &str, category: LogCategory, message: &str) {
        if let Err(err) = self.append_log(name, category, message).await {
            warn!(name, %category, error = %err, "audit log write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_account_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        assert!(AccountStore::read(&store, "alice").await.unwrap().is_none());

        let mut account = Account::new("alice", dec!(10000));
        account.apply_buy("AAPL", 3, dec!(100), dec!(300), "entry");
        AccountStore::write(&store, &account).await.unwrap();

        let loaded = AccountStore::read(&store, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.balance, dec!(9700));
        assert_eq!(loaded.holding("AAPL"), 3);
        assert_eq!(loaded.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let date = Utc::now().date_naive();

        let snapshot = MarketSnapshot::from([("MSFT".to_string(), dec!(300.25))]);
        SnapshotStore::write(&store, date, &snapshot).await.unwrap();

        let loaded = SnapshotStore::read(&store, date).await.unwrap().unwrap();
        assert_eq!(loaded.get("MSFT"), Some(&dec!(300.25)));
    }

    #[tokio::test]
    async fn test_audit_lines_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        store.record("alice", LogCategory::Audit, "bought 5 AAPL").await;
        store.record("alice", LogCategory::Risk, "rejected").await;

        let contents = tokio::fs::read_to_string(dir.path().join("logs/alice.jsonl"))
            .await
            .unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["category"], "audit");
        assert_eq!(first["message"], "bought 5 AAPL");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        tokio::fs::create_dir_all(dir.path().join("accounts"))
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("accounts/bob.json"), b"not json")
            .await
            .unwrap();

        let err = AccountStore::read(&store, "bob").await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}

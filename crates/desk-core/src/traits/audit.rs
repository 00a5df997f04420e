//! Audit log trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Category of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Error,
    Risk,
    Audit,
}

impl std::fmt::Display for LogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogCategory::Error => write!(f, "error"),
            LogCategory::Risk => write!(f, "risk"),
            LogCategory::Audit => write!(f, "audit"),
        }
    }
}

/// Fire-and-forget audit sink.
///
/// The signature is infallible on purpose: a logging failure must never
/// abort the trading operation that produced the entry. Implementations
/// swallow their own errors.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Record an entry for the named account.
    async fn record(&self, name: &str, category: LogCategory, message: &str);
}

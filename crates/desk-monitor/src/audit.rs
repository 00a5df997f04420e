//! Tracing-backed audit sink.

use async_trait::async_trait;
use desk_core::traits::{AuditLog, LogCategory};
use tracing::{error, info, warn};

/// Audit sink that emits tracing events instead of persisting entries.
///
/// Used for ephemeral runs where the JSON store's log files are not
/// wanted; the severity mapping keeps risk rejections visible on the
/// console.
#[derive(Debug, Default)]
pub struct TracingAuditLog;

impl TracingAuditLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLog for TracingAuditLog {
    async fn record(&self, name: &str, category: LogCategory, message: &str) {
        match category {
            LogCategory::Error => error!(account = name, "{}", message),
            LogCategory::Risk => warn!(account = name, "{}", message),
            LogCategory::Audit => info!(account = name, "{}", message),
        }
    }
}

//! Capability traits at the desk's external seams.

mod audit;
mod feed;
mod store;

pub use audit::{AuditLog, LogCategory};
pub use feed::MarketFeed;
pub use store::{AccountStore, SnapshotStore};

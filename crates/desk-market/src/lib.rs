//! Market pricing for the trading desk.
//!
//! Provides the price oracle with its tiered fallback chain and the
//! Polygon REST feed client.

mod oracle;
mod polygon;

pub use oracle::{OracleConfig, PriceOracle};
pub use polygon::{PolygonConfig, PolygonFeed};

//! Logging and audit sinks for the trading desk.

mod audit;
mod logging;

pub use audit::TracingAuditLog;
pub use logging::setup_logging;

//! Core types and traits for the trading desk simulation.
//!
//! This crate provides the foundational building blocks including:
//! - Account, transaction, and market snapshot types
//! - The error taxonomy shared by every component
//! - Capability traits for market feeds, stores, and the audit log

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DeskError, DeskResult};
pub use traits::*;
pub use types::*;

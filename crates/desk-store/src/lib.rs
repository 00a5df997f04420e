//! Store implementations for the trading desk.
//!
//! Two backends behind the same capability traits: `MemoryStore` for tests
//! and ephemeral runs, `JsonStore` for a directory of JSON documents that
//! survives restarts.

mod json_store;
mod memory;

pub use json_store::JsonStore;
pub use memory::MemoryStore;

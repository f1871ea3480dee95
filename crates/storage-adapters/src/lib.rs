//! # storage-adapters
//!
//! Storage implementations of the `domains` port traits. The in-memory store
//! is the default adapter: a transactional-enough local store with
//! per-entity compare-and-swap and optional JSON snapshot persistence.

pub mod memory;

pub use memory::{MemoryStore, Snapshot};

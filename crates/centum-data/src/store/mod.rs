//! Persistence layer for the ticker registry, prices and index tables.

pub mod sqlite;

pub use sqlite::{BuildLock, SqliteStore, StoreStats};

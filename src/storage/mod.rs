//! Persistent key-value storage for cached counts.
//!
//! The cache core only depends on the [`Storage`] trait; hosts embed the
//! crate by implementing it against whatever store they already run.
//! [`MemoryStore`] backs tests and short-lived embedding, [`FileStore`]
//! backs the CLI.

pub mod file;
pub mod memory;

pub use file::{FileStore, StoredKey};
pub use memory::MemoryStore;

use crate::error::Result;

/// Byte-oriented key-value storage.
///
/// Keys are derived deterministically from identities; each key is
/// independently mutable with no multi-key transactions.
pub trait Storage: Send + Sync {
    /// Read the value stored under a key, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value under a key, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

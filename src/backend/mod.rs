//! Store Backends
//!
//! The distributed store is reached through the [`CacheBackend`] trait so the
//! cache service can run against memcached in production and an in-process
//! store in tests.

mod entry;
mod memcached;
mod memory;

pub use entry::MemoryEntry;
pub use memcached::MemcacheBackend;
pub use memory::MemoryBackend;

use crate::error::StoreError;

// == Public Constants ==
/// Maximum key length memcached accepts, in bytes
pub const MAX_KEY_LENGTH: usize = 250;

/// Default memcached item size limit, in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Cache Item ==
/// A single write as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheItem<'a> {
    pub key: &'a str,
    /// JSON-encoded payload
    pub value: Vec<u8>,
    /// Relative expiry in whole seconds, 0 = never
    pub expiry_secs: u32,
}

// == Cache Backend ==
/// Blocking client capability of a key-value store.
///
/// Implementations must be safe to share across threads; the cache service
/// adds no locking of its own.
pub trait CacheBackend: Send + Sync {
    /// Round-trips to every configured endpoint.
    fn ping(&self) -> Result<(), StoreError>;

    /// Writes an item, replacing any existing value.
    fn set(&self, item: CacheItem<'_>) -> Result<(), StoreError>;

    /// Reads a value, `None` when the key is absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Removes a key. Returns whether it was present.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Removes every entry on every endpoint.
    fn flush(&self) -> Result<(), StoreError>;
}

//! Memory Backend
//!
//! In-process store with memcached's expiry and size rules. Stands in for a
//! real server in tests and local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::backend::{CacheBackend, CacheItem, MemoryEntry, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::StoreError;

// == Memory Backend ==
/// HashMap-backed store.
///
/// Expired entries read as absent and are dropped on access. Setting the
/// backend unavailable makes every call fail, liveness probe included.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, MemoryEntry>>,
    unavailable: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the store going down (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored entries that have not yet expired.
    pub fn len(&self) -> usize {
        self.entries()
            .map(|entries| entries.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the raw entry for `key`, expired or not.
    pub fn entry(&self, key: &str) -> Option<MemoryEntry> {
        self.entries().ok()?.get(key).cloned()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, MemoryEntry>>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory backend offline".to_string()));
        }
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory backend lock poisoned".to_string()))
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(StoreError::KeyTooLong(key.len()));
    }
    Ok(())
}

impl CacheBackend for MemoryBackend {
    fn ping(&self) -> Result<(), StoreError> {
        self.entries().map(|_| ())
    }

    fn set(&self, item: CacheItem<'_>) -> Result<(), StoreError> {
        check_key(item.key)?;
        if item.value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::ValueTooLarge(item.value.len()));
        }

        let entry = MemoryEntry::new(item.value, item.expiry_secs);
        self.entries()?.insert(item.key.to_string(), entry);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        check_key(key)?;
        let mut entries = self.entries()?;

        if entries.get(key).is_some_and(MemoryEntry::is_expired) {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        check_key(key)?;
        let removed = self.entries()?.remove(key);
        Ok(removed.is_some_and(|entry| !entry.is_expired()))
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.entries()?.clear();
        Ok(())
    }
}

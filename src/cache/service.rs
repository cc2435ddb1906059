//! Cache Service Module
//!
//! Typed set/get/delete/flush on top of a store backend: JSON encoding at the
//! boundary, default-expiry substitution, and miss-vs-failure separation.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{CacheBackend, CacheItem, MemcacheBackend};
use crate::cache::{CacheStats, StatsSnapshot};
use crate::codec;
use crate::config::CacheConfig;
use crate::error::{CacheError, Operation, Result, StoreError};

// == Cache Service ==
/// Handle to a probed, ready-to-use store.
///
/// Built once at startup and passed to whoever needs it (wrap it in an `Arc`
/// to share across threads). Every call is a blocking round-trip bounded by
/// the configured timeout; nothing is retried.
#[derive(Debug)]
pub struct CacheService<B = MemcacheBackend> {
    config: CacheConfig,
    backend: B,
    stats: CacheStats,
}

impl CacheService<MemcacheBackend> {
    // == Initialize ==
    /// Connects to the memcached servers in `config` and probes them.
    ///
    /// Any failure is [`CacheError::Init`]; the caller decides whether to
    /// abort or run without a cache.
    pub fn connect(config: CacheConfig) -> Result<Self> {
        let backend = MemcacheBackend::connect(&config).map_err(|source| {
            warn!(servers = ?config.servers(), error = %source, "Failed to create memcached client");
            init_error(&config, source)
        })?;
        Self::with_backend(config, backend)
    }
}

impl<B: CacheBackend> CacheService<B> {
    /// Wraps an already-constructed backend, probing it for liveness first.
    pub fn with_backend(config: CacheConfig, backend: B) -> Result<Self> {
        if let Err(source) = backend.ping() {
            warn!(servers = ?config.servers(), error = %source, "Failed to connect to cache servers");
            return Err(init_error(&config, source));
        }

        info!(
            servers = ?config.servers(),
            timeout_ms = u64::try_from(config.timeout().as_millis()).unwrap_or(u64::MAX),
            pool_size = config.pool_size(),
            default_expiry_secs = config.default_expiry().as_secs(),
            "Successfully connected to cache servers"
        );

        Ok(Self {
            config,
            backend,
            stats: CacheStats::new(),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// The TTL is truncated to whole seconds. A TTL that truncates to zero is
    /// replaced by the configured default expiry.
    pub fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let data = codec::encode(key, value).map_err(|err| {
            warn!(key, error = %err, "Failed to serialize value");
            self.stats.record_error();
            err
        })?;

        let item = CacheItem {
            key,
            value: data,
            expiry_secs: self.expiry_secs(ttl),
        };
        let (bytes, expiry_secs) = (item.value.len(), item.expiry_secs);

        self.backend
            .set(item)
            .map_err(|source| self.transport(Operation::Set, Some(key), source))?;

        self.stats.record_set();
        debug!(key, bytes, expiry_secs, "Cached value");
        Ok(())
    }

    // == Get ==
    /// Fetches and decodes the value under `key`.
    ///
    /// `Ok(None)` is a miss (absent or expired), not an error.
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let bytes = self
            .backend
            .get(key)
            .map_err(|source| self.transport(Operation::Get, Some(key), source))?;

        let Some(bytes) = bytes else {
            self.stats.record_miss();
            debug!(key, "Cache miss");
            return Ok(None);
        };

        let value = codec::decode(key, &bytes).map_err(|err| {
            warn!(key, error = %err, "Failed to deserialize cached value");
            self.stats.record_error();
            err
        })?;

        self.stats.record_hit();
        debug!(key, "Cache hit");
        Ok(Some(value))
    }

    // == Delete ==
    /// Removes `key`. Deleting an absent key succeeds.
    pub fn delete(&self, key: &str) -> Result<()> {
        let existed = self
            .backend
            .delete(key)
            .map_err(|source| self.transport(Operation::Delete, Some(key), source))?;

        self.stats.record_delete();
        if existed {
            debug!(key, "Deleted cached value");
        } else {
            debug!(key, "Key not found for deletion");
        }
        Ok(())
    }

    // == Flush ==
    /// Removes every entry on every server, including entries written by
    /// other applications sharing the store. Meant for maintenance and tests.
    pub fn flush(&self) -> Result<()> {
        self.backend
            .flush()
            .map_err(|source| self.transport(Operation::Flush, None, source))?;

        info!("Flushed all cache data");
        Ok(())
    }

    /// Wire expiry for a caller TTL: whole seconds, default when zero,
    /// saturating at the protocol's 32-bit limit.
    fn expiry_secs(&self, ttl: Duration) -> u32 {
        let secs = match ttl.as_secs() {
            0 => self.config.default_expiry().as_secs(),
            secs => secs,
        };
        u32::try_from(secs).unwrap_or(u32::MAX)
    }

    fn transport(&self, op: Operation, key: Option<&str>, source: StoreError) -> CacheError {
        warn!(%op, key, error = %source, "Cache operation failed");
        self.stats.record_error();
        CacheError::transport(op, key, source)
    }
}

fn init_error(config: &CacheConfig, source: StoreError) -> CacheError {
    CacheError::Init {
        servers: config.servers().to_vec(),
        source,
    }
}

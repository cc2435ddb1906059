//! Cache Layer - typed access to a memcached cluster
//!
//! Resolves connection settings from the environment, probes the servers at
//! startup, and exposes JSON-typed get/set/delete/flush plus namespaced key
//! helpers for API responses and chain data.

pub mod backend;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;

pub use backend::{CacheBackend, MemcacheBackend, MemoryBackend};
pub use cache::{CacheService, NamespaceKey};
pub use config::CacheConfig;
pub use error::{CacheError, Result};

//! Cache Module
//!
//! The cache service (connection setup plus typed operations), namespaced key
//! helpers, and outcome statistics.

mod namespace;
mod service;
mod stats;


// Re-export public types
pub use namespace::{NamespaceKey, API_NAMESPACE, BLOCKCHAIN_NAMESPACE};
pub use service::CacheService;
pub use stats::{CacheStats, StatsSnapshot};

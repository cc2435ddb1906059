//! Error types for the cache layer
//!
//! A cache miss is not an error: `get` reports it as `Ok(None)`. Everything
//! below is a real failure and is always handed back to the caller.

use std::fmt;

use thiserror::Error;

// == Operation ==
/// Cache operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Ping,
    Set,
    Get,
    Delete,
    Flush,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Ping => "ping",
            Operation::Set => "set",
            Operation::Get => "get",
            Operation::Delete => "delete",
            Operation::Flush => "flush",
        };
        f.write_str(name)
    }
}

// == Store Error ==
/// Failure reported by a store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error from the memcached client (network, timeout, server error)
    #[error(transparent)]
    Memcache(#[from] memcache::MemcacheError),

    /// Endpoint cannot be turned into a client URL
    #[error("invalid cache endpoint {0}")]
    InvalidEndpoint(String),

    /// Store cannot be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Key exceeds the store's length limit
    #[error("key is {0} bytes, exceeding the store limit")]
    KeyTooLong(usize),

    /// Value exceeds the store's item size limit
    #[error("value is {0} bytes, exceeding the store limit")]
    ValueTooLarge(usize),
}

// == Cache Error ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Store unreachable or misconfigured at startup
    #[error("failed to connect to cache servers {servers:?}: {source}")]
    Init {
        servers: Vec<String>,
        #[source]
        source: StoreError,
    },

    /// Value could not be represented as JSON
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored bytes do not match the requested shape
    #[error("failed to decode value for key {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Network, timeout or store-side failure on a single operation
    #[error("cache {op} failed{}: {source}", key_suffix(.key))]
    Transport {
        op: Operation,
        key: Option<String>,
        #[source]
        source: StoreError,
    },

    /// Namespace key components would make the composed key ambiguous
    #[error("invalid cache key: {0}")]
    InvalidKey(String),
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" for key {}", key),
        None => String::new(),
    }
}

impl CacheError {
    pub(crate) fn transport(op: Operation, key: Option<&str>, source: StoreError) -> Self {
        CacheError::Transport {
            op,
            key: key.map(str::to_string),
            source,
        }
    }

    /// Key the failing operation was addressed to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            CacheError::Encode { key, .. } | CacheError::Decode { key, .. } => Some(key),
            CacheError::Transport { key, .. } => key.as_deref(),
            CacheError::Init { .. } | CacheError::InvalidKey(_) => None,
        }
    }

    pub fn is_init(&self) -> bool {
        matches!(self, CacheError::Init { .. })
    }

    pub fn is_encode(&self) -> bool {
        matches!(self, CacheError::Encode { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, CacheError::Decode { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, CacheError::Transport { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;

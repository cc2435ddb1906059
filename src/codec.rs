//! Serialization boundary
//!
//! Values cross into the store as JSON bytes. Encode and decode failures are
//! reported as distinct error kinds, tagged with the key involved.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

/// Encodes `value` as JSON.
pub fn encode<T>(key: &str, value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(value).map_err(|source| CacheError::Encode {
        key: key.to_string(),
        source,
    })
}

/// Decodes JSON `bytes` into `T`.
///
/// Bytes that are malformed, or well-formed but shaped differently from `T`,
/// both fail with [`CacheError::Decode`].
pub fn decode<T>(key: &str, bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|source| CacheError::Decode {
        key: key.to_string(),
        source,
    })
}

//! Namespace Helpers
//!
//! Composite keys of the form `category:discriminator:identifier`, keeping
//! unrelated data domains apart in a shared store.
//!
//! The layer does not canonicalize identifiers. For API responses the caller
//! must serialize request parameters in a stable order (`a=1&b=2` and
//! `b=2&a=1` are different entries).

use std::fmt;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::backend::CacheBackend;
use crate::cache::CacheService;
use crate::error::{CacheError, Result};

/// Category for cached HTTP API responses.
pub const API_NAMESPACE: &str = "api";
/// Category for cached ledger/chain data.
pub const BLOCKCHAIN_NAMESPACE: &str = "blockchain";

const SEPARATOR: char = ':';

// == Namespace Key ==
/// A validated `category:discriminator:identifier` key.
///
/// Category and discriminator must be non-empty and free of `:`, so the
/// first two separators always delimit them and distinct triples never
/// produce the same key. The identifier is the trailing segment and may
/// contain anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceKey(String);

impl NamespaceKey {
    pub fn new(category: &str, discriminator: &str, identifier: &str) -> Result<Self> {
        check_segment("category", category)?;
        check_segment("discriminator", discriminator)?;
        Ok(Self(format!(
            "{category}{SEPARATOR}{discriminator}{SEPARATOR}{identifier}"
        )))
    }

    /// Key for an API response: `api:<endpoint>:<params>`.
    pub fn api(endpoint: &str, params: &str) -> Result<Self> {
        Self::new(API_NAMESPACE, endpoint, params)
    }

    /// Key for chain data: `blockchain:<data_type>:<identifier>`.
    pub fn blockchain(data_type: &str, identifier: &str) -> Result<Self> {
        Self::new(BLOCKCHAIN_NAMESPACE, data_type, identifier)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NamespaceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn check_segment(name: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(CacheError::InvalidKey(format!("{name} cannot be empty")));
    }
    if segment.contains(SEPARATOR) {
        return Err(CacheError::InvalidKey(format!(
            "{name} {segment:?} contains '{SEPARATOR}'"
        )));
    }
    Ok(())
}

// == Namespaced Operations ==
// Thin wrappers: TTL and error handling are exactly those of set/get/delete.
impl<B: CacheBackend> CacheService<B> {
    pub fn set_namespaced<T>(
        &self,
        category: &str,
        discriminator: &str,
        identifier: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let key = NamespaceKey::new(category, discriminator, identifier)?;
        self.set(key.as_str(), value, ttl)
    }

    pub fn get_namespaced<T>(
        &self,
        category: &str,
        discriminator: &str,
        identifier: &str,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = NamespaceKey::new(category, discriminator, identifier)?;
        self.get(key.as_str())
    }

    pub fn delete_namespaced(
        &self,
        category: &str,
        discriminator: &str,
        identifier: &str,
    ) -> Result<()> {
        let key = NamespaceKey::new(category, discriminator, identifier)?;
        self.delete(key.as_str())
    }

    /// Caches an API response under `api:<endpoint>:<params>`.
    ///
    /// `params` must already be in a stable order.
    pub fn set_api_response<T>(
        &self,
        endpoint: &str,
        params: &str,
        response: &T,
        ttl: Duration,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.set_namespaced(API_NAMESPACE, endpoint, params, response, ttl)
    }

    pub fn get_api_response<T>(&self, endpoint: &str, params: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.get_namespaced(API_NAMESPACE, endpoint, params)
    }

    /// Caches chain data under `blockchain:<data_type>:<identifier>`.
    pub fn set_blockchain_data<T>(
        &self,
        data_type: &str,
        identifier: &str,
        data: &T,
        ttl: Duration,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.set_namespaced(BLOCKCHAIN_NAMESPACE, data_type, identifier, data, ttl)
    }

    pub fn get_blockchain_data<T>(&self, data_type: &str, identifier: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.get_namespaced(BLOCKCHAIN_NAMESPACE, data_type, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::config::CacheConfig;

    fn service() -> CacheService<MemoryBackend> {
        CacheService::with_backend(CacheConfig::default(), MemoryBackend::new()).unwrap()
    }

    #[test]
    fn test_key_format() {
        let key = NamespaceKey::new("api", "/users", "page=2").unwrap();
        assert_eq!(key.as_str(), "api:/users:page=2");
        assert_eq!(key.to_string(), "api:/users:page=2");
    }

    #[test]
    fn test_domain_constructors() {
        assert_eq!(
            NamespaceKey::api("/blocks", "limit=10").unwrap().as_str(),
            "api:/blocks:limit=10"
        );
        assert_eq!(
            NamespaceKey::blockchain("block", "000000abc").unwrap().as_str(),
            "blockchain:block:000000abc"
        );
    }

    #[test]
    fn test_identifier_may_contain_separator() {
        let key = NamespaceKey::blockchain("utxo", "txid:0").unwrap();
        assert_eq!(key.as_str(), "blockchain:utxo:txid:0");
    }

    #[test]
    fn test_separator_in_discriminator_rejected() {
        // Would otherwise collide with ("api", "a", "b:c")
        let err = NamespaceKey::new("api", "a:b", "c").unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey(_)));
        assert!(NamespaceKey::new("a:pi", "x", "y").is_err());
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(NamespaceKey::new("", "x", "y").is_err());
        assert!(NamespaceKey::new("api", "", "y").is_err());
        assert!(NamespaceKey::new("api", "x", "").is_ok());
    }

    #[test]
    fn test_namespaced_round_trip_and_isolation() {
        let cache = service();
        let users = vec!["alice".to_string(), "bob".to_string()];

        cache
            .set_namespaced("api", "/users", "page=2", &users, Duration::from_secs(60))
            .unwrap();

        let hit: Option<Vec<String>> = cache.get_namespaced("api", "/users", "page=2").unwrap();
        assert_eq!(hit, Some(users));

        let other_page: Option<Vec<String>> =
            cache.get_namespaced("api", "/users", "page=3").unwrap();
        assert!(other_page.is_none());

        let other_endpoint: Option<Vec<String>> =
            cache.get_namespaced("api", "/groups", "page=2").unwrap();
        assert!(other_endpoint.is_none());
    }

    #[test]
    fn test_api_and_blockchain_do_not_collide() {
        let cache = service();

        cache
            .set_api_response("block", "1", &"response", Duration::ZERO)
            .unwrap();
        cache
            .set_blockchain_data("block", "1", &"chain", Duration::ZERO)
            .unwrap();

        let api: Option<String> = cache.get_api_response("block", "1").unwrap();
        let chain: Option<String> = cache.get_blockchain_data("block", "1").unwrap();
        assert_eq!(api.as_deref(), Some("response"));
        assert_eq!(chain.as_deref(), Some("chain"));
    }

    #[test]
    fn test_api_response_uses_plain_key() {
        let cache = service();

        cache
            .set_api_response("/users", "page=2", &7u32, Duration::ZERO)
            .unwrap();

        let raw: Option<u32> = cache.get("api:/users:page=2").unwrap();
        assert_eq!(raw, Some(7));
    }

    #[test]
    fn test_delete_namespaced() {
        let cache = service();

        cache
            .set_blockchain_data("tx", "abc", &1u8, Duration::ZERO)
            .unwrap();
        cache.delete_namespaced(BLOCKCHAIN_NAMESPACE, "tx", "abc").unwrap();

        assert!(cache.get_blockchain_data::<u8>("tx", "abc").unwrap().is_none());
    }

    #[test]
    fn test_invalid_key_never_reaches_store() {
        let cache = service();

        let err = cache
            .set_namespaced("api", "bad:endpoint", "x", &1, Duration::ZERO)
            .unwrap_err();

        assert!(matches!(err, CacheError::InvalidKey(_)));
        assert!(cache.backend().is_empty());
        assert_eq!(cache.stats().sets, 0);
    }
}

//! Memcached Backend
//!
//! [`CacheBackend`] over the `memcache` client crate.

use std::time::Duration;

use memcache::Client;
use url::Url;

use crate::backend::{CacheBackend, CacheItem};
use crate::config::CacheConfig;
use crate::error::StoreError;

const SCHEME: &str = "memcache";
/// Socket read/write deadline.
const TIMEOUT_PARAM: &str = "timeout";
/// How long the connection pool waits to hand out (or open) a connection.
const CONNECT_TIMEOUT_PARAM: &str = "connect_timeout";

/// Client bound to the configured memcached endpoints.
///
/// The underlying client keeps a pool of `config.pool_size()` connections per
/// endpoint and distributes keys across them; it is safe for concurrent use.
pub struct MemcacheBackend {
    client: Client,
}

impl MemcacheBackend {
    /// Builds a client for `config.servers()`.
    ///
    /// `config.timeout()` bounds connecting, reading and writing on every
    /// connection. Connecting does not prove the servers answer; see
    /// [`CacheBackend::ping`].
    pub fn connect(config: &CacheConfig) -> Result<Self, StoreError> {
        let urls = config
            .servers()
            .iter()
            .map(|server| endpoint_url(server, config.timeout()))
            .collect::<Result<Vec<String>, StoreError>>()?;
        let client = Client::with_pool_size(urls, config.pool_size())?;
        Ok(Self { client })
    }
}

/// Turns an endpoint into a memcache URL carrying the configured timeout.
///
/// Bare `host:port` entries get the `memcache://` scheme. Explicit URLs keep
/// their scheme and other query parameters, but any timeout they carry is
/// replaced by the configured one.
fn endpoint_url(server: &str, timeout: Duration) -> Result<String, StoreError> {
    let raw = if server.contains("://") {
        server.to_string()
    } else {
        format!("{SCHEME}://{server}")
    };
    let mut url = Url::parse(&raw)
        .map_err(|err| StoreError::InvalidEndpoint(format!("{server}: {err}")))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(StoreError::InvalidEndpoint(format!("{server}: missing host")));
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != TIMEOUT_PARAM && name != CONNECT_TIMEOUT_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    let secs = timeout.as_secs_f64().to_string();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(TIMEOUT_PARAM, &secs)
        .append_pair(CONNECT_TIMEOUT_PARAM, &secs);
    Ok(url.into())
}

impl CacheBackend for MemcacheBackend {
    fn ping(&self) -> Result<(), StoreError> {
        // version() talks to every server and fails if any of them does
        self.client.version()?;
        Ok(())
    }

    fn set(&self, item: CacheItem<'_>) -> Result<(), StoreError> {
        self.client
            .set(item.key, item.value.as_slice(), item.expiry_secs)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.client.get::<Vec<u8>>(key)?)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.client.delete(key)?)
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.client.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for MemcacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemcacheBackend").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(url: &str, name: &str) -> Option<String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_endpoint_url_adds_scheme_and_both_timeouts() {
        assert_eq!(
            endpoint_url("localhost:11211", Duration::from_secs(1)).unwrap(),
            "memcache://localhost:11211?timeout=1&connect_timeout=1"
        );
    }

    #[test]
    fn test_endpoint_url_fractional_timeout() {
        let url = endpoint_url("cache:11211", Duration::from_millis(2500)).unwrap();
        assert_eq!(param(&url, "timeout").as_deref(), Some("2.5"));
        assert_eq!(param(&url, "connect_timeout").as_deref(), Some("2.5"));
    }

    #[test]
    fn test_explicit_url_gets_configured_timeouts() {
        let url = endpoint_url("memcache+udp://cache:11211", Duration::from_secs(3)).unwrap();

        assert!(url.starts_with("memcache+udp://cache:11211"));
        assert_eq!(param(&url, "timeout").as_deref(), Some("3"));
        assert_eq!(param(&url, "connect_timeout").as_deref(), Some("3"));
    }

    #[test]
    fn test_explicit_url_keeps_other_params_and_overrides_timeouts() {
        let url = endpoint_url(
            "memcache://cache:11211?protocol=ascii&timeout=60&connect_timeout=30",
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(param(&url, "protocol").as_deref(), Some("ascii"));
        assert_eq!(param(&url, "timeout").as_deref(), Some("1"));
        assert_eq!(param(&url, "connect_timeout").as_deref(), Some("1"));
        assert_eq!(Url::parse(&url).unwrap().query_pairs().count(), 3);
    }

    #[test]
    fn test_endpoint_without_host_is_rejected() {
        let result = endpoint_url(":11211", Duration::from_secs(1));
        assert!(matches!(result, Err(StoreError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_connect_timeout_bounds_unreachable_server() {
        let config = CacheConfig::new(["127.0.0.1:1"]).with_timeout(Duration::from_secs(1));
        let started = std::time::Instant::now();

        let result = MemcacheBackend::connect(&config).and_then(|backend| backend.ping());

        assert!(result.is_err());
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "connect took {:?}",
            started.elapsed()
        );
    }
}

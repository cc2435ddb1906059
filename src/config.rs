//! Configuration Module
//!
//! Resolves cache connection parameters from hard defaults overlaid with
//! environment overrides. A malformed override never aborts startup: it is
//! logged and the default for that field is kept.

use std::env;
use std::time::Duration;

use tracing::warn;

// == Environment Variables ==
/// Comma-delimited list of `host:port` endpoints.
pub const SERVERS_ENV: &str = "MEMCACHED_SERVERS";
/// Per-operation network timeout, integer seconds.
pub const TIMEOUT_ENV: &str = "MEMCACHED_TIMEOUT_SECONDS";
/// Expiry applied when `set` is called with a zero TTL, integer seconds.
pub const DEFAULT_EXPIRY_ENV: &str = "MEMCACHED_DEFAULT_EXPIRY_SECONDS";
/// Connections kept per endpoint.
pub const POOL_SIZE_ENV: &str = "MEMCACHED_POOL_SIZE";

// == Defaults ==
pub const DEFAULT_SERVER: &str = "localhost:11211";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_POOL_SIZE: u32 = 16;

// == Cache Config ==
/// Cache connection parameters.
///
/// Always fully populated: `servers` is non-empty, `timeout` and `pool_size`
/// are non-zero. A zero `default_expiry` means this layer enforces no expiry
/// of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Store endpoints, in order
    servers: Vec<String>,
    /// Connect, read and write deadline of every network call
    timeout: Duration,
    /// Expiry substituted for a zero TTL
    default_expiry: Duration,
    /// Connections per endpoint, i.e. how many callers can talk to one
    /// server at the same time
    pool_size: u32,
}

impl CacheConfig {
    // == Constructor ==
    /// Creates a config bound to `servers` with default timeout, expiry and
    /// pool size.
    ///
    /// An empty server list falls back to the default endpoint.
    pub fn new<I, S>(servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let servers: Vec<String> = servers.into_iter().map(Into::into).collect();
        let mut config = Self::default();
        if !servers.is_empty() {
            config.servers = servers;
        }
        config
    }

    // == Builders ==
    /// Sets the per-operation timeout. A zero duration is ignored.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    /// Sets the expiry used when `set` is given a zero TTL.
    pub fn with_default_expiry(mut self, default_expiry: Duration) -> Self {
        self.default_expiry = default_expiry;
        self
    }

    /// Sets the number of connections per endpoint. Zero is ignored.
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        if pool_size > 0 {
            self.pool_size = pool_size;
        }
        self
    }

    // == Environment ==
    /// Creates a config by overlaying environment variables on the defaults.
    ///
    /// # Environment Variables
    /// - `MEMCACHED_SERVERS` - Comma-separated endpoints (default: localhost:11211)
    /// - `MEMCACHED_TIMEOUT_SECONDS` - Network timeout (default: 1)
    /// - `MEMCACHED_DEFAULT_EXPIRY_SECONDS` - Default TTL (default: 3600)
    /// - `MEMCACHED_POOL_SIZE` - Connections per endpoint (default: 16)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves a config from an arbitrary variable source.
    ///
    /// Each field is overridden independently. Unset or empty variables keep
    /// the default silently; malformed ones keep it with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = present(&lookup, SERVERS_ENV) {
            let servers = parse_servers(&raw);
            if servers.is_empty() {
                warn!(
                    var = SERVERS_ENV,
                    value = %raw,
                    "No usable endpoints in override, using default"
                );
            } else {
                config.servers = servers;
            }
        }

        if let Some(raw) = present(&lookup, TIMEOUT_ENV) {
            match parse_seconds(&raw) {
                Some(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(
                    var = TIMEOUT_ENV,
                    value = %raw,
                    default_secs = config.timeout.as_secs(),
                    "Invalid timeout override, using default"
                ),
            }
        }

        if let Some(raw) = present(&lookup, DEFAULT_EXPIRY_ENV) {
            match parse_seconds(&raw) {
                Some(secs) => config.default_expiry = Duration::from_secs(secs),
                None => warn!(
                    var = DEFAULT_EXPIRY_ENV,
                    value = %raw,
                    default_secs = config.default_expiry.as_secs(),
                    "Invalid default expiry override, using default"
                ),
            }
        }

        if let Some(raw) = present(&lookup, POOL_SIZE_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => config.pool_size = size,
                _ => warn!(
                    var = POOL_SIZE_ENV,
                    value = %raw,
                    default_size = config.pool_size,
                    "Invalid pool size override, using default"
                ),
            }
        }

        config
    }

    // == Accessors ==
    /// Store endpoints, never empty.
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Deadline for connecting, reading and writing; never zero.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Expiry applied when `set` is given a zero TTL.
    pub fn default_expiry(&self) -> Duration {
        self.default_expiry
    }

    /// Connections kept per endpoint; never zero.
    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            servers: vec![DEFAULT_SERVER.to_string()],
            timeout: DEFAULT_TIMEOUT,
            default_expiry: DEFAULT_EXPIRY,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

// == Parsing Helpers ==
fn present<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn parse_servers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|server| !server.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_seconds(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

//! Cache Probe - startup check for the memcached cache layer
//!
//! Resolves the cache configuration from the environment, connects, and
//! probes every configured server. Exits non-zero when the cache is not
//! usable, so it can gate deployments or container health checks.
//!
//! Pass `--flush` to additionally drop every entry in the store.

use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_layer::{CacheConfig, CacheService};

fn main() -> ExitCode {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_layer=info,cache_probe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let flush = std::env::args().skip(1).any(|arg| arg == "--flush");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: servers={:?}, timeout={}s, default_expiry={}s",
        config.servers(),
        config.timeout().as_secs(),
        config.default_expiry().as_secs()
    );

    let cache = CacheService::connect(config).context("cache is unavailable")?;

    if flush {
        warn!("Flushing all entries from every cache server");
        cache.flush().context("flush failed")?;
    }

    info!("Cache probe complete");
    Ok(())
}

//! Live memcached tests
//!
//! Need a reachable server. Run with:
//! `MEMCACHED_SERVERS=localhost:11211 cargo test -- --ignored`

use std::time::Duration;

use cache_layer::{CacheConfig, CacheService};

fn live_cache() -> CacheService {
    CacheService::connect(CacheConfig::from_env()).expect("memcached must be reachable")
}

#[test]
#[ignore]
fn test_live_round_trip_and_delete() {
    let cache = live_cache();
    let key = "cache_layer:test:round_trip";

    cache
        .set(key, &vec!["a", "b"], Duration::from_secs(30))
        .unwrap();
    let got: Option<Vec<String>> = cache.get(key).unwrap();
    assert_eq!(got, Some(vec!["a".to_string(), "b".to_string()]));

    cache.delete(key).unwrap();
    cache.delete(key).unwrap();
    assert!(cache.get::<Vec<String>>(key).unwrap().is_none());
}

#[test]
#[ignore]
fn test_live_default_expiry() {
    let config = CacheConfig::from_env().with_default_expiry(Duration::from_secs(1));
    let cache = CacheService::connect(config).unwrap();
    let key = "cache_layer:test:default_expiry";

    cache.set(key, &1u32, Duration::ZERO).unwrap();
    assert_eq!(cache.get::<u32>(key).unwrap(), Some(1));

    // memcached expiry has one-second granularity
    std::thread::sleep(Duration::from_millis(2100));

    assert!(cache.get::<u32>(key).unwrap().is_none());
}

#[test]
#[ignore]
fn test_live_unreachable_server_fails_init() {
    let config = CacheConfig::new(["127.0.0.1:1"]).with_timeout(Duration::from_secs(1));

    let result = CacheService::connect(config);

    assert!(result.unwrap_err().is_init());
}

#[test]
#[ignore]
fn test_live_concurrent_callers_share_pool() {
    let config = CacheConfig::from_env().with_pool_size(8);
    let cache = std::sync::Arc::new(CacheService::connect(config).unwrap());
    let started = std::time::Instant::now();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let cache = std::sync::Arc::clone(&cache);
            std::thread::spawn(move || {
                for round in 0..25 {
                    let key = format!("cache_layer:test:pool:{}:{}", worker, round);
                    cache.set(&key, &round, Duration::from_secs(30)).unwrap();
                    assert_eq!(cache.get::<u32>(&key).unwrap(), Some(round));
                    cache.delete(&key).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(started.elapsed() < Duration::from_secs(10));
}

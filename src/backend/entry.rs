//! Memory Entry Module
//!
//! A stored payload plus the instant it stops being retrievable.

use std::time::{Duration, Instant};

// == Memory Entry ==
/// A single entry held by [`MemoryBackend`](super::MemoryBackend).
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    /// The stored bytes
    pub value: Vec<u8>,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl MemoryEntry {
    // == Constructor ==
    /// Creates an entry expiring `expiry_secs` from now.
    ///
    /// Zero means the entry never expires, as in memcached.
    pub fn new(value: Vec<u8>, expiry_secs: u32) -> Self {
        let expires_at = (expiry_secs > 0)
            .then(|| Instant::now() + Duration::from_secs(u64::from(expiry_secs)));
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration
    /// instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Remaining lifetime, or None if the entry never expires.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

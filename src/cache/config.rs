//! Cache timing configuration.
//!
//! `stale_time` and `max_age` are the only timeout knobs in the consistency
//! layer: an entry younger than `stale_time` is fresh, one older than
//! `max_age` is gone, and anything in between is served stale while a
//! background refresh runs.

use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_STALE_TIME_MS: u64 = 30_000;
const DEFAULT_MAX_AGE_MS: u64 = 600_000;
const DEFAULT_COLLECTION_TTL_MS: u64 = 300_000;

/// Cache timing configuration, typically deserialized from the host
/// application's settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Freshness window (ms): reads within it never hit the backing store.
    pub stale_time_ms: u64,
    /// Absolute expiration (ms): entries older than this are treated as
    /// absent and reloaded synchronously.
    pub max_age_ms: u64,
    /// Expiration (ms) for whole-collection caches
    /// ([`RepositoryCacheManager`](super::RepositoryCacheManager)).
    pub collection_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_ms: DEFAULT_STALE_TIME_MS,
            max_age_ms: DEFAULT_MAX_AGE_MS,
            collection_ttl_ms: DEFAULT_COLLECTION_TTL_MS,
        }
    }
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    /// `max_age` clamped to never undercut `stale_time`; a servable entry
    /// must not expire before it goes stale.
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms.max(self.stale_time_ms))
    }

    pub fn collection_ttl(&self) -> Duration {
        Duration::from_millis(self.collection_ttl_ms)
    }
}

//! A single timestamped cache slot.

use std::time::{Duration, Instant};

/// One cached value plus the bookkeeping the stale-while-revalidate policy
/// needs: when it was last updated and whether a background refresh for it is
/// already in flight.
///
/// Entries are replaced wholesale on successful refresh; only the
/// `is_refreshing` flag is ever mutated in place. The owning map guarantees
/// at most one in-flight refresh per key at any time.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub last_updated: Instant,
    pub is_refreshing: bool,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            last_updated: Instant::now(),
            is_refreshing: false,
        }
    }

    pub fn age(&self) -> Duration {
        self.last_updated.elapsed()
    }

    /// Within the freshness window; serve without any refresh.
    pub fn is_fresh(&self, stale_time: Duration) -> bool {
        self.age() <= stale_time
    }

    /// Past the absolute expiration; treat as a cache miss.
    pub fn is_expired(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, age: Duration) {
        if let Some(past) = Instant::now().checked_sub(age) {
            self.last_updated = past;
        }
    }
}

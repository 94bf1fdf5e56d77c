//! Stale-while-revalidate per-key cache core.
//!
//! One `SwrCache` instance owns one keyed map of [`CacheEntry`] values and one
//! refresh lock. The decorators hold a typed `SwrCache` per result shape and
//! route every read operation through [`SwrCache::get_or_revalidate`].
//!
//! Locking discipline: the entry map sits behind a `std::sync::RwLock` and is
//! only touched in short, non-awaiting critical sections; the async
//! `tokio::sync::Mutex` serializes the create-if-absent and refresh-if-stale
//! paths, both of which double-check the map after acquiring it so fast reads
//! never queue behind a slow load.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::entry::CacheEntry;
use super::lock::{rw_read, rw_write};
use crate::domain::StoreError;

const SOURCE: &str = "cache::swr";

/// Loader invoked on cache miss and during background refresh. It has to be
/// `'static` because refreshes outlive the read that triggered them.
pub type Factory<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, StoreError>> + Send + Sync>;

enum Lookup<T> {
    Fresh(T),
    Stale { value: T, refreshing: bool },
    Miss,
}

pub struct SwrCache<T> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    refresh_lock: Arc<Mutex<()>>,
    stale_time: Duration,
    max_age: Duration,
    provider: Arc<str>,
}

impl<T> SwrCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(provider: &str, config: &CacheConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            refresh_lock: Arc::new(Mutex::new(())),
            stale_time: config.stale_time(),
            max_age: config.max_age(),
            provider: Arc::from(provider),
        }
    }

    /// Serve `key` from cache, refreshing per the stale-while-revalidate
    /// policy.
    ///
    /// Fresh hits and stale hits return immediately; a stale hit additionally
    /// spawns one detached refresh task (single-flight per key). Only a miss
    /// invokes `factory` on the caller's path, and only a miss propagates its
    /// failure. Dropping the returned future never cancels an already
    /// spawned refresh.
    pub async fn get_or_revalidate(&self, key: &str, factory: Factory<T>) -> Result<T, StoreError> {
        match self.lookup(key) {
            Lookup::Fresh(value) => Ok(value),
            Lookup::Stale { value, refreshing } => {
                if !refreshing {
                    self.spawn_refresh(key.to_string(), factory);
                }
                Ok(value)
            }
            Lookup::Miss => self.load(key, factory).await,
        }
    }

    /// Drop every entry for this provider namespace.
    pub fn invalidate_all(&self) {
        rw_write(&self.entries, SOURCE, "invalidate_all").clear();
        debug!(provider = %self.provider, "Cache namespace invalidated");
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Lookup<T> {
        let entries = rw_read(&self.entries, SOURCE, "lookup");
        match entries.get(key) {
            None => Lookup::Miss,
            Some(entry) if entry.is_expired(self.max_age) => Lookup::Miss,
            Some(entry) if entry.is_fresh(self.stale_time) => Lookup::Fresh(entry.value.clone()),
            Some(entry) => Lookup::Stale {
                value: entry.value.clone(),
                refreshing: entry.is_refreshing,
            },
        }
    }

    /// Miss path: exclusive load with a double-check after the lock.
    async fn load(&self, key: &str, factory: Factory<T>) -> Result<T, StoreError> {
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have populated the entry while the lock was
        // contended.
        match self.lookup(key) {
            Lookup::Fresh(value) | Lookup::Stale { value, .. } => return Ok(value),
            Lookup::Miss => {}
        }

        debug!(key, provider = %self.provider, "Cache miss; loading from repository");
        let value = factory().await?;
        rw_write(&self.entries, SOURCE, "load.store")
            .insert(key.to_string(), CacheEntry::new(value.clone()));
        Ok(value)
    }

    /// Detached refresh. The task re-verifies and claims the entry under the
    /// refresh lock, so racing spawns collapse into one factory invocation.
    fn spawn_refresh(&self, key: String, factory: Factory<T>) {
        let entries = Arc::clone(&self.entries);
        let refresh_lock = Arc::clone(&self.refresh_lock);
        let stale_time = self.stale_time;
        let provider = Arc::clone(&self.provider);

        tokio::spawn(async move {
            let _guard = refresh_lock.lock().await;

            {
                let mut map = rw_write(&entries, SOURCE, "refresh.claim");
                match map.get_mut(&key) {
                    // Still present, still stale, nobody else on it: claim.
                    Some(entry) if !entry.is_refreshing && !entry.is_fresh(stale_time) => {
                        entry.is_refreshing = true;
                    }
                    _ => return,
                }
            }

            match factory().await {
                Ok(value) => {
                    rw_write(&entries, SOURCE, "refresh.store")
                        .insert(key.clone(), CacheEntry::new(value));
                    debug!(key, provider = %provider, "Background refresh completed");
                }
                Err(error) => {
                    if let Some(entry) = rw_write(&entries, SOURCE, "refresh.reset").get_mut(&key)
                    {
                        entry.is_refreshing = false;
                    }
                    warn!(
                        key,
                        provider = %provider,
                        %error,
                        "Background refresh failed; keeping stale value"
                    );
                }
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &str, age: Duration) {
        if let Some(entry) = rw_write(&self.entries, SOURCE, "backdate").get_mut(key) {
            entry.backdate(age);
        }
    }
}

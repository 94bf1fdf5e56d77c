//! Whole-collection cache for small enumerable datasets.
//!
//! Unlike the per-key [`SwrCache`](super::SwrCache), this caches one entire
//! map (e.g. all directories of a provider) and replaces it wholesale on
//! refresh; the map is never partially updated.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::lock::{rw_read, rw_write};
use crate::domain::StoreError;

const SOURCE: &str = "cache::manager";

struct ManagerState<K, V> {
    cache: Option<HashMap<K, V>>,
    expires_at: Instant,
}

pub struct RepositoryCacheManager<K, V> {
    state: RwLock<ManagerState<K, V>>,
    load_lock: Mutex<()>,
    ttl: Duration,
    provider: String,
}

impl<K, V> RepositoryCacheManager<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(provider: impl Into<String>, ttl: Duration) -> Self {
        Self {
            state: RwLock::new(ManagerState {
                cache: None,
                expires_at: Instant::now(),
            }),
            load_lock: Mutex::new(()),
            ttl,
            provider: provider.into(),
        }
    }

    /// Return the cached collection, reloading it through `loader` when
    /// absent, expired, or `force_refresh` is set.
    ///
    /// The first check is lock-free; the loader runs under an exclusive lock
    /// with a re-check, so concurrent callers never duplicate a load. If the
    /// loader fails and a previous collection exists, the stale collection is
    /// returned and the failure only logged; with nothing cached the failure
    /// propagates.
    pub async fn get_cached_entities<F, Fut>(
        &self,
        loader: F,
        force_refresh: bool,
    ) -> Result<HashMap<K, V>, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HashMap<K, V>, StoreError>>,
    {
        if !force_refresh {
            if let Some(cached) = self.current() {
                return Ok(cached);
            }
        }

        let _guard = self.load_lock.lock().await;

        // Re-check: another caller may have reloaded while we waited.
        if !force_refresh {
            if let Some(cached) = self.current() {
                return Ok(cached);
            }
        }

        debug!(provider = %self.provider, force_refresh, "Reloading collection cache");
        match loader().await {
            Ok(entities) => {
                let mut state = rw_write(&self.state, SOURCE, "store");
                state.cache = Some(entities.clone());
                state.expires_at = Instant::now() + self.ttl;
                Ok(entities)
            }
            Err(error) => {
                let state = rw_read(&self.state, SOURCE, "stale_fallback");
                match &state.cache {
                    Some(stale) => {
                        warn!(
                            provider = %self.provider,
                            %error,
                            "Collection reload failed; serving stale cache"
                        );
                        Ok(stale.clone())
                    }
                    None => Err(error),
                }
            }
        }
    }

    /// Clear the collection and reset the expiration, under the load lock.
    pub async fn invalidate_cache(&self) {
        let _guard = self.load_lock.lock().await;
        let mut state = rw_write(&self.state, SOURCE, "invalidate");
        state.cache = None;
        state.expires_at = Instant::now();
    }

    fn current(&self) -> Option<HashMap<K, V>> {
        let state = rw_read(&self.state, SOURCE, "current");
        if Instant::now() < state.expires_at {
            state.cache.clone()
        } else {
            None
        }
    }
}

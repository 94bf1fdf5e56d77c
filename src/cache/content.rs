//! Stale-while-revalidate decorator for content repositories.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use uuid::Uuid;

use super::config::CacheConfig;
use super::keys;
use super::swr::SwrCache;
use crate::domain::{ContentItem, ContentQuery, StoreError};
use crate::repos::ContentRepository;

/// Caches every read of the wrapped [`ContentRepository`]; writes pass
/// through and invalidate the whole provider namespace.
///
/// Two caches back the decorator, one per result shape: single items and
/// item lists. Both share the configured `stale_time`/`max_age` and are
/// cleared together, so a write can never leave a cached query whose result
/// set silently contains (or misses) the written entity.
pub struct StaleWhileRevalidateContentCache {
    inner: Arc<dyn ContentRepository>,
    provider: String,
    items: SwrCache<Option<ContentItem>>,
    lists: SwrCache<Vec<ContentItem>>,
}

impl StaleWhileRevalidateContentCache {
    pub fn new(inner: Arc<dyn ContentRepository>, provider: &str, config: &CacheConfig) -> Self {
        Self {
            inner,
            provider: provider.to_string(),
            items: SwrCache::new(provider, config),
            lists: SwrCache::new(provider, config),
        }
    }

    /// Writes are rare relative to reads and no targeted invalidation can
    /// safely predict every cached query affected by one entity, so the
    /// whole namespace goes.
    async fn invalidate_and_refresh(&self) -> Result<(), StoreError> {
        self.items.invalidate_all();
        self.lists.invalidate_all();
        self.inner.refresh_cache().await
    }
}

#[async_trait]
impl ContentRepository for StaleWhileRevalidateContentCache {
    async fn get_all(&self) -> Result<Vec<ContentItem>, StoreError> {
        let key = keys::content_all_key(&self.provider);
        let inner = Arc::clone(&self.inner);
        self.lists
            .get_or_revalidate(
                &key,
                Arc::new(move || {
                    let inner = Arc::clone(&inner);
                    async move { inner.get_all().await }.boxed()
                }),
            )
            .await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        let key = keys::content_id_key(&self.provider, id);
        let inner = Arc::clone(&self.inner);
        self.items
            .get_or_revalidate(
                &key,
                Arc::new(move || {
                    let inner = Arc::clone(&inner);
                    async move { inner.get_by_id(id).await }.boxed()
                }),
            )
            .await
    }

    async fn get_by_path(&self, path: &str) -> Result<Option<ContentItem>, StoreError> {
        let key = keys::content_path_key(&self.provider, path);
        let inner = Arc::clone(&self.inner);
        let path = path.to_string();
        self.items
            .get_or_revalidate(
                &key,
                Arc::new(move || {
                    let inner = Arc::clone(&inner);
                    let path = path.clone();
                    async move { inner.get_by_path(&path).await }.boxed()
                }),
            )
            .await
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<ContentItem>, StoreError> {
        let key = keys::content_url_key(&self.provider, url);
        let inner = Arc::clone(&self.inner);
        let url = url.to_string();
        self.items
            .get_or_revalidate(
                &key,
                Arc::new(move || {
                    let inner = Arc::clone(&inner);
                    let url = url.clone();
                    async move { inner.get_by_url(&url).await }.boxed()
                }),
            )
            .await
    }

    async fn find_by_query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, StoreError> {
        let key = keys::content_query_key(&self.provider, query);
        let inner = Arc::clone(&self.inner);
        let query = query.clone();
        self.lists
            .get_or_revalidate(
                &key,
                Arc::new(move || {
                    let inner = Arc::clone(&inner);
                    let query = query.clone();
                    async move { inner.find_by_query(&query).await }.boxed()
                }),
            )
            .await
    }

    async fn save(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
        let saved = self.inner.save(item).await?;
        self.invalidate_and_refresh().await?;
        Ok(saved)
    }

    async fn save_with_message(
        &self,
        item: ContentItem,
        message: &str,
    ) -> Result<ContentItem, StoreError> {
        let saved = self.inner.save_with_message(item, message).await?;
        self.invalidate_and_refresh().await?;
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.delete(id).await?;
        self.invalidate_and_refresh().await
    }

    async fn delete_with_message(&self, id: Uuid, message: &str) -> Result<(), StoreError> {
        self.inner.delete_with_message(id, message).await?;
        self.invalidate_and_refresh().await
    }

    async fn refresh_cache(&self) -> Result<(), StoreError> {
        self.invalidate_and_refresh().await
    }
}

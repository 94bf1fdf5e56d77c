//! Stale-while-revalidate decorator for directory repositories.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use super::config::CacheConfig;
use super::keys;
use super::swr::SwrCache;
use crate::domain::{DirectoryItem, StoreError};
use crate::repos::DirectoryRepository;

/// Same policy as the content decorator: cached reads, pass-through writes,
/// full-namespace invalidation on every write.
pub struct StaleWhileRevalidateDirectoryCache {
    inner: Arc<dyn DirectoryRepository>,
    provider: String,
    directories: SwrCache<Option<DirectoryItem>>,
    collections: SwrCache<Vec<DirectoryItem>>,
}

impl StaleWhileRevalidateDirectoryCache {
    pub fn new(inner: Arc<dyn DirectoryRepository>, provider: &str, config: &CacheConfig) -> Self {
        Self {
            inner,
            provider: provider.to_string(),
            directories: SwrCache::new(provider, config),
            collections: SwrCache::new(provider, config),
        }
    }

    async fn invalidate_and_refresh(&self) -> Result<(), StoreError> {
        self.directories.invalidate_all();
        self.collections.invalidate_all();
        self.inner.refresh_cache().await
    }
}

#[async_trait]
impl DirectoryRepository for StaleWhileRevalidateDirectoryCache {
    async fn get_all(&self) -> Result<Vec<DirectoryItem>, StoreError> {
        let key = keys::directory_all_key(&self.provider);
        let inner = Arc::clone(&self.inner);
        self.collections
            .get_or_revalidate(
                &key,
                Arc::new(move || {
                    let inner = Arc::clone(&inner);
                    async move { inner.get_all().await }.boxed()
                }),
            )
            .await
    }

    async fn get_by_path(&self, path: &str) -> Result<Option<DirectoryItem>, StoreError> {
        let key = keys::directory_path_key(&self.provider, path);
        let inner = Arc::clone(&self.inner);
        let path = path.to_string();
        self.directories
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

    async fn get_tree(&self, root: Option<&str>) -> Result<Vec<DirectoryItem>, StoreError> {
        let key = keys::directory_tree_key(&self.provider, root);
        let inner = Arc::clone(&self.inner);
        let root = root.map(str::to_string);
        self.collections
            .get_or_revalidate(
                &key,
                Arc::new(move || {
                    let inner = Arc::clone(&inner);
                    let root = root.clone();
                    async move { inner.get_tree(root.as_deref()).await }.boxed()
                }),
            )
            .await
    }

    async fn save(&self, directory: DirectoryItem) -> Result<DirectoryItem, StoreError> {
        let saved = self.inner.save(directory).await?;
        self.invalidate_and_refresh().await?;
        Ok(saved)
    }

    async fn save_with_message(
        &self,
        directory: DirectoryItem,
        message: &str,
    ) -> Result<DirectoryItem, StoreError> {
        let saved = self.inner.save_with_message(directory, message).await?;
        self.invalidate_and_refresh().await?;
        Ok(saved)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.inner.delete(path).await?;
        self.invalidate_and_refresh().await
    }

    async fn delete_with_message(&self, path: &str, message: &str) -> Result<(), StoreError> {
        self.inner.delete_with_message(path, message).await?;
        self.invalidate_and_refresh().await
    }

    async fn refresh_cache(&self) -> Result<(), StoreError> {
        self.invalidate_and_refresh().await
    }
}

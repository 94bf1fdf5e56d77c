//! Repository traits describing content persistence adapters.
//!
//! Both the raw store adapters (filesystem, GitHub) and the
//! stale-while-revalidate decorators implement these traits, so a caller
//! cannot distinguish a cached repository from a raw one except by behavior.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContentItem, ContentQuery, DirectoryItem, StoreError};

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<ContentItem>, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError>;

    async fn get_by_path(&self, path: &str) -> Result<Option<ContentItem>, StoreError>;

    async fn get_by_url(&self, url: &str) -> Result<Option<ContentItem>, StoreError>;

    async fn find_by_query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, StoreError>;

    async fn save(&self, item: ContentItem) -> Result<ContentItem, StoreError>;

    /// Save with an adapter-specific commit message (meaningful for
    /// git-backed stores, ignored by others).
    async fn save_with_message(
        &self,
        item: ContentItem,
        message: &str,
    ) -> Result<ContentItem, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn delete_with_message(&self, id: Uuid, message: &str) -> Result<(), StoreError>;

    /// Adapter-level cache refresh hook, invoked after writes.
    async fn refresh_cache(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<DirectoryItem>, StoreError>;

    async fn get_by_path(&self, path: &str) -> Result<Option<DirectoryItem>, StoreError>;

    /// Directories under `root` (the whole tree when `root` is `None`).
    async fn get_tree(&self, root: Option<&str>) -> Result<Vec<DirectoryItem>, StoreError>;

    async fn save(&self, directory: DirectoryItem) -> Result<DirectoryItem, StoreError>;

    async fn save_with_message(
        &self,
        directory: DirectoryItem,
        message: &str,
    ) -> Result<DirectoryItem, StoreError>;

    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    async fn delete_with_message(&self, path: &str, message: &str) -> Result<(), StoreError>;

    async fn refresh_cache(&self) -> Result<(), StoreError>;
}

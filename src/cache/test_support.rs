//! In-memory repositories used by the cache and transaction tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{ContentItem, ContentQuery, DirectoryItem, StoreError};
use crate::repos::{ContentRepository, DirectoryRepository};

pub(crate) fn sample_item(slug: &str) -> ContentItem {
    ContentItem {
        id: Uuid::new_v4(),
        path: format!("posts/{slug}.md"),
        url: format!("/blog/{slug}"),
        slug: slug.to_string(),
        title: slug.to_string(),
        description: String::new(),
        author: "tester".to_string(),
        body_markdown: format!("# {slug}"),
        categories: vec!["general".to_string()],
        tags: vec!["rust".to_string()],
        locale: None,
        is_featured: false,
        published_at: Some(OffsetDateTime::now_utc()),
        updated_at: OffsetDateTime::now_utc(),
    }
}

pub(crate) fn sample_directory(path: &str) -> DirectoryItem {
    DirectoryItem {
        path: path.to_string(),
        url: format!("/{path}"),
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        parent_path: path.rsplit_once('/').map(|(parent, _)| parent.to_string()),
        sort_order: 0,
        updated_at: OffsetDateTime::now_utc(),
    }
}

/// Counting in-memory content repository. `save` rejects items with an empty
/// title so failure paths can be exercised.
#[derive(Default)]
pub(crate) struct MockContentRepository {
    items: Mutex<Vec<ContentItem>>,
    read_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl MockContentRepository {
    pub(crate) fn insert(&self, item: ContentItem) {
        self.items.lock().unwrap().push(item);
    }

    pub(crate) fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn count_read(&self) {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentRepository for MockContentRepository {
    async fn get_all(&self) -> Result<Vec<ContentItem>, StoreError> {
        self.count_read();
        Ok(self.items.lock().unwrap().clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        self.count_read();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn get_by_path(&self, path: &str) -> Result<Option<ContentItem>, StoreError> {
        self.count_read();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.path == path)
            .cloned())
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<ContentItem>, StoreError> {
        self.count_read();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.url == url)
            .cloned())
    }

    async fn find_by_query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, StoreError> {
        self.count_read();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| {
                query
                    .tag
                    .as_ref()
                    .is_none_or(|tag| item.tags.contains(tag))
                    && query
                        .category
                        .as_ref()
                        .is_none_or(|category| item.categories.contains(category))
                    && query.slug.as_ref().is_none_or(|slug| &item.slug == slug)
            })
            .cloned()
            .collect())
    }

    async fn save(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
        if item.title.is_empty() {
            return Err(StoreError::validation("title", "title must not be empty"));
        }
        let mut items = self.items.lock().unwrap();
        items.retain(|existing| existing.id != item.id);
        items.push(item.clone());
        Ok(item)
    }

    async fn save_with_message(
        &self,
        item: ContentItem,
        _message: &str,
    ) -> Result<ContentItem, StoreError> {
        self.save(item).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.items.lock().unwrap().retain(|item| item.id != id);
        Ok(())
    }

    async fn delete_with_message(&self, id: Uuid, _message: &str) -> Result<(), StoreError> {
        self.delete(id).await
    }

    async fn refresh_cache(&self) -> Result<(), StoreError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockDirectoryRepository {
    directories: Mutex<Vec<DirectoryItem>>,
    read_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl MockDirectoryRepository {
    pub(crate) fn insert(&self, directory: DirectoryItem) {
        self.directories.lock().unwrap().push(directory);
    }

    pub(crate) fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn count_read(&self) {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DirectoryRepository for MockDirectoryRepository {
    async fn get_all(&self) -> Result<Vec<DirectoryItem>, StoreError> {
        self.count_read();
        Ok(self.directories.lock().unwrap().clone())
    }

    async fn get_by_path(&self, path: &str) -> Result<Option<DirectoryItem>, StoreError> {
        self.count_read();
        Ok(self
            .directories
            .lock()
            .unwrap()
            .iter()
            .find(|directory| directory.path == path)
            .cloned())
    }

    async fn get_tree(&self, root: Option<&str>) -> Result<Vec<DirectoryItem>, StoreError> {
        self.count_read();
        Ok(self
            .directories
            .lock()
            .unwrap()
            .iter()
            .filter(|directory| root.is_none_or(|root| directory.path.starts_with(root)))
            .cloned()
            .collect())
    }

    async fn save(&self, directory: DirectoryItem) -> Result<DirectoryItem, StoreError> {
        let mut directories = self.directories.lock().unwrap();
        directories.retain(|existing| existing.path != directory.path);
        directories.push(directory.clone());
        Ok(directory)
    }

    async fn save_with_message(
        &self,
        directory: DirectoryItem,
        _message: &str,
    ) -> Result<DirectoryItem, StoreError> {
        self.save(directory).await
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.directories
            .lock()
            .unwrap()
            .retain(|directory| directory.path != path);
        Ok(())
    }

    async fn delete_with_message(&self, path: &str, _message: &str) -> Result<(), StoreError> {
        self.delete(path).await
    }

    async fn refresh_cache(&self) -> Result<(), StoreError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

//! Domain entities mirrored from the backing content store.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A single piece of content (article, page, snippet) as stored by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: Uuid,
    /// Provider-relative storage path, e.g. `posts/2026/hello.md`.
    pub path: String,
    /// Public URL the item is served under.
    pub url: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub body_markdown: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub locale: Option<String>,
    pub is_featured: bool,
    pub published_at: Option<OffsetDateTime>,
    pub updated_at: OffsetDateTime,
}

/// A directory (folder/section) in the content hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryItem {
    /// Provider-relative storage path, unique within a provider.
    pub path: String,
    pub url: String,
    pub name: String,
    pub parent_path: Option<String>,
    pub sort_order: i32,
    pub updated_at: OffsetDateTime,
}

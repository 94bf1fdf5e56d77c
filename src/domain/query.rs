//! Query surface for filtered content reads.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SortField {
    #[default]
    PublishedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::PublishedAt => "published_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

impl SortDirection {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Descending => "desc",
            Self::Ascending => "asc",
        }
    }
}

/// Filter for `find_by_query`. All fields default to "no constraint" so that
/// two logically equal queries compare (and cache) identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentQuery {
    pub directory: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub locale: Option<String>,
    pub featured: Option<bool>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub skip: u32,
    pub take: Option<u32>,
}

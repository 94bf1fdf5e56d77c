//! Cache key derivation.
//!
//! Keys are plain strings built from provider identity, operation, and the
//! significant query parameters. Two logically equal queries under the same
//! provider must produce the same key; unset and default fields are omitted
//! so that equivalent queries do not fan out into distinct keys.

use std::fmt::Write as _;

use uuid::Uuid;

use crate::domain::{ContentQuery, SortDirection, SortField};

pub fn content_all_key(provider: &str) -> String {
    format!("content:all:{provider}")
}

pub fn content_id_key(provider: &str, id: Uuid) -> String {
    format!("content:{id}:{provider}")
}

pub fn content_path_key(provider: &str, path: &str) -> String {
    format!("content:path:{path}:{provider}")
}

pub fn content_url_key(provider: &str, url: &str) -> String {
    format!("content:url:{url}:{provider}")
}

pub fn directory_all_key(provider: &str) -> String {
    format!("directory:all:{provider}")
}

pub fn directory_path_key(provider: &str, path: &str) -> String {
    format!("directory:{path}:{provider}")
}

pub fn directory_tree_key(provider: &str, root: Option<&str>) -> String {
    match root {
        Some(root) => format!("directory:tree:{root}:{provider}"),
        None => format!("directory:tree:{provider}"),
    }
}

/// Key for a filtered query. Field order is fixed; only constrained fields
/// and non-default sort/pagination appear.
pub fn content_query_key(provider: &str, query: &ContentQuery) -> String {
    let mut key = format!("content:query:{provider}");

    let mut push = |name: &str, value: &str| {
        // Infallible for String targets.
        let _ = write!(key, ":{name}={value}");
    };

    if let Some(directory) = &query.directory {
        push("dir", directory);
    }
    if let Some(slug) = &query.slug {
        push("slug", slug);
    }
    if let Some(category) = &query.category {
        push("cat", category);
    }
    if let Some(tag) = &query.tag {
        push("tag", tag);
    }
    if let Some(search) = &query.search {
        push("search", search);
    }
    if let Some(locale) = &query.locale {
        push("locale", locale);
    }
    if let Some(featured) = query.featured {
        push("featured", if featured { "1" } else { "0" });
    }
    if query.sort_field != SortField::default() || query.sort_direction != SortDirection::default()
    {
        push(
            "sort",
            &format!(
                "{}.{}",
                query.sort_field.as_str(),
                query.sort_direction.as_str()
            ),
        );
    }
    if query.skip > 0 {
        push("skip", &query.skip.to_string());
    }
    if let Some(take) = query.take {
        push("take", &take.to_string());
    }

    key
}

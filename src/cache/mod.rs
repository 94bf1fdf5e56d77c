//! Content repository caching.
//!
//! Two caching shapes, both guarded per instance (caches of different
//! providers never contend with each other):
//!
//! - **Per-key stale-while-revalidate** ([`SwrCache`], used by the
//!   decorators): serves cached values immediately, even past their
//!   freshness window, while a detached single-flight refresh runs.
//! - **Whole-collection** ([`RepositoryCacheManager`]): one enumerable map
//!   replaced wholesale, returning stale data when a reload fails.

mod config;
mod content;
mod directory;
mod entry;
pub mod keys;
pub(crate) mod lock;
mod manager;
mod swr;
#[cfg(test)]
pub(crate) mod test_support;

pub use config::CacheConfig;
pub use content::StaleWhileRevalidateContentCache;
pub use directory::StaleWhileRevalidateDirectoryCache;
pub use entry::CacheEntry;
pub use manager::RepositoryCacheManager;
pub use swr::{Factory, SwrCache};

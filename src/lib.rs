//! Foglio: the consistency layer for pluggable content repositories.
//!
//! Content stores (a plain filesystem, a GitHub repository over HTTP) are
//! neither fast nor transactional. This crate puts both properties in front
//! of them:
//!
//! - **Caching** ([`cache`]): stale-while-revalidate decorators that
//!   implement the same repository traits they wrap, plus a whole-collection
//!   cache for small enumerable datasets. Reads are served from cache,
//!   writes pass through and invalidate the provider namespace.
//! - **Transactions** ([`uow`]): a unit-of-work state machine with
//!   begin/commit/rollback/savepoint semantics, emulated per backend with
//!   file backups or a temporary branch plus a pull request.
//!
//! Composition happens at construction time:
//!
//! ```ignore
//! let store: Arc<dyn ContentRepository> = Arc::new(GitHubContentStore::new(client));
//! let repo = StaleWhileRevalidateContentCache::new(store, "github", &CacheConfig::default());
//! // Callers only ever see `dyn ContentRepository`.
//! ```

pub mod cache;
pub mod domain;
pub mod github;
pub mod repos;
pub mod uow;

pub use cache::{
    CacheConfig, CacheEntry, RepositoryCacheManager, StaleWhileRevalidateContentCache,
    StaleWhileRevalidateDirectoryCache,
};
pub use domain::{
    ContentEvent, ContentItem, ContentQuery, DirectoryItem, DomainEventDispatcher,
    EventCollector, SortDirection, SortField, StoreError,
};
pub use github::GitHubApiClient;
pub use repos::{ContentRepository, DirectoryRepository};
pub use uow::{
    FileSystemBackend, FileSystemUnitOfWork, GitHubBackend, GitHubUnitOfWork,
    TransactionBackend, UnitOfWork,
};

//! Domain model consumed by the cache and transaction layers.

pub mod entities;
pub mod error;
pub mod events;
pub mod query;

pub use entities::{ContentItem, DirectoryItem};
pub use error::StoreError;
pub use events::{ContentEvent, DomainEventDispatcher, EventCollector};
pub use query::{ContentQuery, SortDirection, SortField};

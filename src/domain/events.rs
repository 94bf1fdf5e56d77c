//! Domain events accumulated during a transaction and dispatched on commit.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::cache::lock::mutex_lock;
use crate::domain::error::StoreError;

const SOURCE: &str = "domain::events";

/// Something observable happened to the content repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEvent {
    ContentSaved { id: Uuid, slug: String },
    ContentDeleted { id: Uuid, slug: String },
    DirectorySaved { path: String },
    DirectoryDeleted { path: String },
}

/// Receives domain events strictly after a transaction durably committed.
#[async_trait]
pub trait DomainEventDispatcher: Send + Sync {
    async fn dispatch(&self, event: ContentEvent) -> Result<(), StoreError>;
}

/// Transaction-scoped event buffer.
///
/// Cloned handles share one buffer, so repositories participating in a
/// transaction can record events that the unit of work drains on commit.
/// Events recorded into a transaction that rolls back are discarded.
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<ContentEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: ContentEvent) {
        mutex_lock(&self.events, SOURCE, "record").push(event);
    }

    pub fn drain(&self) -> Vec<ContentEvent> {
        mutex_lock(&self.events, SOURCE, "drain")
            .drain(..)
            .collect()
    }

    pub fn discard(&self) {
        mutex_lock(&self.events, SOURCE, "discard").clear();
    }

    pub fn is_empty(&self) -> bool {
        mutex_lock(&self.events, SOURCE, "is_empty").is_empty()
    }
}

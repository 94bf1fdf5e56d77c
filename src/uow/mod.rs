//! Unit-of-work transaction coordination.
//!
//! [`UnitOfWork`] owns the Idle/Active state machine, savepoint ordering,
//! and post-commit event dispatch; what begin, commit, and rollback actually
//! mean for a given store is injected through a [`TransactionBackend`].
//! Backends emulate atomicity over stores with no native transactions: the
//! filesystem backend with per-file backups, the GitHub backend with a
//! temporary branch and a pull request on commit.

mod fs;
mod github;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{DomainEventDispatcher, EventCollector, StoreError};

pub use fs::FileSystemBackend;
pub use github::GitHubBackend;

/// Backend strategy invoked by the coordinator at each state transition.
///
/// Hooks are only called while the transition is legal; the coordinator
/// rejects out-of-state calls before a backend ever sees them. The savepoint
/// hooks are additionally skipped when [`supports_savepoints`] is false.
///
/// [`supports_savepoints`]: TransactionBackend::supports_savepoints
#[async_trait]
pub trait TransactionBackend: Send {
    /// Short backend name used in log records.
    fn label(&self) -> &'static str;

    /// Whether savepoints have real rollback granularity on this backend.
    /// When false, savepoint operations are accepted as logged no-ops.
    fn supports_savepoints(&self) -> bool {
        true
    }

    async fn on_begin(&mut self) -> Result<(), StoreError>;

    async fn on_commit(&mut self) -> Result<(), StoreError>;

    async fn on_rollback(&mut self) -> Result<(), StoreError>;

    async fn on_savepoint(&mut self, name: &str) -> Result<(), StoreError>;

    async fn on_rollback_to_savepoint(&mut self, name: &str) -> Result<(), StoreError>;

    /// Synchronous best-effort rollback for the drop path. Must not panic.
    fn on_abandon(&mut self);
}

/// Transaction coordinator over a pluggable backend.
///
/// Savepoints are an explicitly ordered sequence, so "remove everything
/// created after X" is a plain truncation rather than an assumption about
/// map iteration order.
pub struct UnitOfWork<B: TransactionBackend> {
    backend: B,
    dispatcher: Arc<dyn DomainEventDispatcher>,
    events: EventCollector,
    started: bool,
    savepoints: Vec<String>,
}

/// Unit of work faking atomicity with per-file backup copies.
pub type FileSystemUnitOfWork = UnitOfWork<FileSystemBackend>;

/// Unit of work faking atomicity with a temporary branch and a pull request.
pub type GitHubUnitOfWork = UnitOfWork<GitHubBackend>;

impl<B: TransactionBackend> UnitOfWork<B> {
    pub fn new(backend: B, dispatcher: Arc<dyn DomainEventDispatcher>) -> Self {
        Self {
            backend,
            dispatcher,
            events: EventCollector::new(),
            started: false,
            savepoints: Vec::new(),
        }
    }

    /// Handle repositories use to record domain events into this
    /// transaction. Events are dispatched on commit and discarded on
    /// rollback.
    pub fn events(&self) -> EventCollector {
        self.events.clone()
    }

    pub fn is_active(&self) -> bool {
        self.started
    }

    pub fn savepoints(&self) -> &[String] {
        &self.savepoints
    }

    /// Idle to Active. Fails if a transaction is already open; a failing
    /// backend hook leaves the state Idle.
    pub async fn begin(&mut self) -> Result<(), StoreError> {
        if self.started {
            return Err(StoreError::invalid_operation(
                "a transaction is already active",
            ));
        }
        self.backend.on_begin().await?;
        self.started = true;
        Ok(())
    }

    /// Active to Idle, dispatching accumulated domain events strictly after
    /// the backend commit succeeded. A failed backend commit leaves the
    /// transaction Active so the caller can retry or roll back explicitly.
    /// Dispatch failures are logged, not propagated: the commit is already
    /// durable.
    pub async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_active("commit")?;
        self.backend.on_commit().await?;
        self.started = false;
        self.savepoints.clear();

        for event in self.events.drain() {
            if let Err(error) = self.dispatcher.dispatch(event).await {
                warn!(
                    backend = self.backend.label(),
                    %error,
                    "Domain event dispatch failed after commit"
                );
            }
        }
        Ok(())
    }

    /// Active to Idle, discarding recorded events.
    pub async fn rollback(&mut self) -> Result<(), StoreError> {
        self.ensure_active("rollback")?;
        self.backend.on_rollback().await?;
        self.started = false;
        self.savepoints.clear();
        self.events.discard();
        Ok(())
    }

    /// Record a named marker within the open transaction. Duplicate names
    /// are rejected; on backends without savepoint support this is a logged
    /// no-op.
    pub async fn savepoint(&mut self, name: &str) -> Result<(), StoreError> {
        self.ensure_active("savepoint")?;
        if !self.backend.supports_savepoints() {
            warn!(
                backend = self.backend.label(),
                savepoint = name,
                "Backend does not support savepoints; accepting as no-op"
            );
            return Ok(());
        }
        if self.savepoints.iter().any(|existing| existing == name) {
            return Err(StoreError::validation(
                "savepoint",
                format!("savepoint `{name}` already exists"),
            ));
        }
        self.backend.on_savepoint(name).await?;
        self.savepoints.push(name.to_string());
        Ok(())
    }

    /// Undo everything recorded after `name`, removing the savepoints
    /// created after it. The transaction stays Active.
    pub async fn rollback_to_savepoint(&mut self, name: &str) -> Result<(), StoreError> {
        self.ensure_active("rollback_to_savepoint")?;
        if !self.backend.supports_savepoints() {
            warn!(
                backend = self.backend.label(),
                savepoint = name,
                "Backend does not support savepoints; rollback request ignored"
            );
            return Ok(());
        }
        let index = self
            .savepoints
            .iter()
            .position(|existing| existing == name)
            .ok_or_else(|| {
                StoreError::invalid_operation(format!("unknown savepoint `{name}`"))
            })?;
        self.backend.on_rollback_to_savepoint(name).await?;
        self.savepoints.truncate(index + 1);
        Ok(())
    }

    /// Orderly disposal: rolls back if still Active, logging (not
    /// propagating) a rollback failure.
    pub async fn close(mut self) {
        if self.started {
            warn!(
                backend = self.backend.label(),
                "Unit of work closed while active; rolling back"
            );
            if let Err(error) = self.rollback().await {
                warn!(
                    backend = self.backend.label(),
                    %error,
                    "Rollback during close failed"
                );
                // Drop must not attempt a second rollback.
                self.started = false;
            }
        }
    }

    pub(crate) fn backend(&mut self) -> &mut B {
        &mut self.backend
    }

    pub(crate) fn ensure_active(&self, operation: &str) -> Result<(), StoreError> {
        if self.started {
            Ok(())
        } else {
            Err(StoreError::invalid_operation(format!(
                "{operation} requires an active transaction"
            )))
        }
    }
}

impl<B: TransactionBackend> Drop for UnitOfWork<B> {
    fn drop(&mut self) {
        if self.started {
            warn!(
                backend = self.backend.label(),
                "Unit of work dropped while active; attempting rollback"
            );
            self.backend.on_abandon();
            self.started = false;
            self.events.discard();
        }
    }
}

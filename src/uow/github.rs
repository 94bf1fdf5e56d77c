//! GitHub transaction backend.
//!
//! A "transaction" is a short-lived branch: begin creates a uniquely named
//! branch off the original branch and points the API client at it, commit
//! opens a pull request back to the original branch, rollback just switches
//! the client back. The temporary branch may be left behind after a rollback;
//! cleaning it up is deferred, not guaranteed.
//!
//! Savepoints have no rollback granularity on this backend and are accepted
//! as logged no-ops; see
//! [`supports_savepoints`](super::TransactionBackend::supports_savepoints).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::TransactionBackend;
use crate::domain::StoreError;
use crate::github::GitHubApiClient;

pub struct GitHubBackend {
    client: Arc<dyn GitHubApiClient>,
    original_branch: String,
    temp_branch: Option<String>,
}

impl GitHubBackend {
    /// `original_branch` is the branch transactions fork from and pull
    /// requests target. It is a required input; the live current branch of
    /// the client is deliberately not consulted.
    pub fn new(client: Arc<dyn GitHubApiClient>, original_branch: impl Into<String>) -> Self {
        Self {
            client,
            original_branch: original_branch.into(),
            temp_branch: None,
        }
    }

    pub fn temp_branch(&self) -> Option<&str> {
        self.temp_branch.as_deref()
    }
}

#[async_trait]
impl TransactionBackend for GitHubBackend {
    fn label(&self) -> &'static str {
        "github"
    }

    fn supports_savepoints(&self) -> bool {
        false
    }

    async fn on_begin(&mut self) -> Result<(), StoreError> {
        let branch = format!("content-tx-{}", Uuid::new_v4().simple());
        self.client
            .create_branch(&branch, &self.original_branch)
            .await?;
        self.client.set_branch(&branch);
        debug!(branch, from = %self.original_branch, "Opened transaction branch");
        self.temp_branch = Some(branch);
        Ok(())
    }

    async fn on_commit(&mut self) -> Result<(), StoreError> {
        let branch = self.temp_branch.take().ok_or_else(|| {
            StoreError::invalid_operation("commit without a transaction branch on record")
        })?;

        let title = format!("Content update from `{branch}`");
        let body = format!(
            "Automated content transaction. Merging `{branch}` into `{}`.",
            self.original_branch
        );
        if let Err(error) = self
            .client
            .create_pull_request(&title, &body, &branch, &self.original_branch)
            .await
        {
            // Keep the branch on record so the caller can retry or roll back.
            self.temp_branch = Some(branch);
            return Err(error);
        }

        self.client.set_branch(&self.original_branch);
        Ok(())
    }

    async fn on_rollback(&mut self) -> Result<(), StoreError> {
        self.client.set_branch(&self.original_branch);
        if let Some(branch) = self.temp_branch.take() {
            debug!(branch, "Discarded transaction branch; left for later cleanup");
        }
        Ok(())
    }

    async fn on_savepoint(&mut self, _name: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn on_rollback_to_savepoint(&mut self, _name: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn on_abandon(&mut self) {
        self.client.set_branch(&self.original_branch);
        self.temp_branch = None;
    }
}

//! GitHub API client surface consumed by the GitHub-backed unit of work.

use async_trait::async_trait;

use crate::domain::StoreError;

/// Minimal branch and pull-request operations against a GitHub repository.
///
/// `set_branch` only changes which branch subsequent API calls address; it
/// performs no I/O, which is what makes it safe to call from a drop path.
#[async_trait]
pub trait GitHubApiClient: Send + Sync {
    async fn create_branch(&self, name: &str, from_branch: &str) -> Result<(), StoreError>;

    fn set_branch(&self, name: &str);

    fn current_branch(&self) -> String;

    async fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<(), StoreError>;
}

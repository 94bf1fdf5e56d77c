//! Filesystem transaction backend.
//!
//! A "transaction" is a set of tracked file paths. The first time a path is
//! tracked, the live file (if any) is copied into the backup directory with a
//! `.bak` suffix. Commit accepts the live state and deletes the backups;
//! rollback copies every backup over its live file. Savepoints snapshot the
//! tracked list, so rolling back to one restores exactly the files tracked
//! after it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{TransactionBackend, UnitOfWork};
use crate::domain::StoreError;

// Unit separator: cannot occur in a path.
const SNAPSHOT_DELIMITER: char = '\u{1f}';

pub struct FileSystemBackend {
    backup_dir: PathBuf,
    tracked: Vec<PathBuf>,
    snapshots: Vec<(String, String)>,
}

impl FileSystemBackend {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            tracked: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    /// Backup file name flattened from the full path, so same-named files in
    /// different directories never collide in the backup directory.
    fn backup_path(&self, path: &Path) -> PathBuf {
        let flattened: String = path
            .to_string_lossy()
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.backup_dir.join(format!("{flattened}.bak"))
    }

    pub(crate) async fn track(&mut self, path: &Path) -> Result<(), StoreError> {
        if self.tracked.iter().any(|tracked| tracked == path) {
            return Ok(());
        }

        let backup = self.backup_path(path);
        let live_exists = fs::try_exists(path)
            .await
            .map_err(|source| StoreError::file_system(path, source))?;
        let backup_exists = fs::try_exists(&backup)
            .await
            .map_err(|source| StoreError::file_system(&backup, source))?;

        if live_exists && !backup_exists {
            fs::copy(path, &backup)
                .await
                .map_err(|source| StoreError::file_system(path, source))?;
            debug!(path = %path.display(), backup = %backup.display(), "Backed up file");
        }

        self.tracked.push(path.to_path_buf());
        Ok(())
    }

    async fn restore(&self, path: &Path) -> Result<(), StoreError> {
        let backup = self.backup_path(path);
        let backup_exists = fs::try_exists(&backup)
            .await
            .map_err(|source| StoreError::file_system(&backup, source))?;
        if backup_exists {
            fs::copy(&backup, path)
                .await
                .map_err(|source| StoreError::file_system(path, source))?;
            fs::remove_file(&backup)
                .await
                .map_err(|source| StoreError::file_system(&backup, source))?;
        }
        Ok(())
    }

    fn snapshot(&self) -> String {
        self.tracked
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(&SNAPSHOT_DELIMITER.to_string())
    }
}

#[async_trait]
impl TransactionBackend for FileSystemBackend {
    fn label(&self) -> &'static str {
        "filesystem"
    }

    async fn on_begin(&mut self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|source| StoreError::file_system(&self.backup_dir, source))?;
        self.tracked.clear();
        self.snapshots.clear();
        Ok(())
    }

    async fn on_commit(&mut self) -> Result<(), StoreError> {
        for path in &self.tracked {
            let backup = self.backup_path(path);
            let backup_exists = fs::try_exists(&backup)
                .await
                .map_err(|source| StoreError::file_system(&backup, source))?;
            if backup_exists {
                fs::remove_file(&backup)
                    .await
                    .map_err(|source| StoreError::file_system(&backup, source))?;
            }
        }
        self.tracked.clear();
        self.snapshots.clear();
        Ok(())
    }

    async fn on_rollback(&mut self) -> Result<(), StoreError> {
        let tracked = std::mem::take(&mut self.tracked);
        for path in tracked.iter().rev() {
            self.restore(path).await?;
        }
        self.snapshots.clear();
        Ok(())
    }

    async fn on_savepoint(&mut self, name: &str) -> Result<(), StoreError> {
        self.snapshots.push((name.to_string(), self.snapshot()));
        Ok(())
    }

    async fn on_rollback_to_savepoint(&mut self, name: &str) -> Result<(), StoreError> {
        let index = self
            .snapshots
            .iter()
            .position(|(existing, _)| existing == name)
            .ok_or_else(|| {
                StoreError::invalid_operation(format!("unknown savepoint `{name}`"))
            })?;

        let snapshot = self.snapshots[index].1.clone();
        let kept: Vec<PathBuf> = if snapshot.is_empty() {
            Vec::new()
        } else {
            snapshot
                .split(SNAPSHOT_DELIMITER)
                .map(PathBuf::from)
                .collect()
        };

        // Restore exactly the files tracked after the savepoint was taken.
        let tracked = std::mem::take(&mut self.tracked);
        for path in tracked.iter().rev() {
            if !kept.contains(path) {
                self.restore(path).await?;
            }
        }
        self.tracked = tracked.into_iter().filter(|p| kept.contains(p)).collect();
        self.snapshots.truncate(index + 1);
        Ok(())
    }

    fn on_abandon(&mut self) {
        let tracked = std::mem::take(&mut self.tracked);
        for path in tracked.iter().rev() {
            let backup = self.backup_path(path);
            if backup.exists() {
                let restored = std::fs::copy(&backup, path)
                    .and_then(|_| std::fs::remove_file(&backup));
                if let Err(error) = restored {
                    warn!(
                        path = %path.display(),
                        %error,
                        "Failed to restore file while abandoning transaction"
                    );
                }
            }
        }
        self.snapshots.clear();
    }
}

impl UnitOfWork<FileSystemBackend> {
    /// Register `path` as modified by this transaction, backing up its
    /// current content the first time. Idempotent per path per
    /// transaction; calling it without an active transaction is a
    /// programming error and fails loudly.
    pub async fn track_modified_file(&mut self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        self.ensure_active("track_modified_file")?;
        self.backend().track(path.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::{ContentEvent, DomainEventDispatcher, StoreError};

    struct NullDispatcher;

    #[async_trait]
    impl DomainEventDispatcher for NullDispatcher {
        async fn dispatch(&self, _event: ContentEvent) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn unit_of_work(dir: &TempDir) -> UnitOfWork<FileSystemBackend> {
        UnitOfWork::new(
            FileSystemBackend::new(dir.path().join(".backups")),
            Arc::new(NullDispatcher),
        )
    }

    async fn write(path: &Path, content: &str) {
        fs::write(path, content).await.unwrap();
    }

    async fn read(path: &Path) -> String {
        fs::read_to_string(path).await.unwrap()
    }

    #[tokio::test]
    async fn rollback_restores_pre_transaction_content() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("article.md");
        write(&file, "v1").await;

        let mut uow = unit_of_work(&dir);
        uow.begin().await.unwrap();
        uow.track_modified_file(&file).await.unwrap();
        write(&file, "v2").await;

        uow.rollback().await.unwrap();

        assert_eq!(read(&file).await, "v1");
        // No backup remains.
        let mut entries = fs::read_dir(dir.path().join(".backups")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_keeps_live_state_and_drops_backups() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("article.md");
        write(&file, "v1").await;

        let mut uow = unit_of_work(&dir);
        uow.begin().await.unwrap();
        uow.track_modified_file(&file).await.unwrap();
        write(&file, "v2").await;

        uow.commit().await.unwrap();

        assert_eq!(read(&file).await, "v2");
        let mut entries = fs::read_dir(dir.path().join(".backups")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tracking_is_idempotent_per_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("article.md");
        write(&file, "v1").await;

        let mut uow = unit_of_work(&dir);
        uow.begin().await.unwrap();
        uow.track_modified_file(&file).await.unwrap();
        write(&file, "v2").await;
        // Second track must not overwrite the v1 backup with v2.
        uow.track_modified_file(&file).await.unwrap();

        uow.rollback().await.unwrap();
        assert_eq!(read(&file).await, "v1");
    }

    #[tokio::test]
    async fn rollback_to_savepoint_restores_only_later_files() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("kept.md");
        let second = dir.path().join("undone.md");
        write(&first, "first-v1").await;
        write(&second, "second-v1").await;

        let mut uow = unit_of_work(&dir);
        uow.begin().await.unwrap();
        uow.track_modified_file(&first).await.unwrap();
        write(&first, "first-v2").await;
        uow.savepoint("after-first").await.unwrap();

        uow.track_modified_file(&second).await.unwrap();
        write(&second, "second-v2").await;

        uow.rollback_to_savepoint("after-first").await.unwrap();

        assert_eq!(read(&first).await, "first-v2");
        assert_eq!(read(&second).await, "second-v1");
        assert!(uow.is_active());

        // The first file is still covered by the outer transaction.
        uow.rollback().await.unwrap();
        assert_eq!(read(&first).await, "first-v1");
    }

    #[tokio::test]
    async fn tracking_a_new_file_requires_no_backup() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("created.md");

        let mut uow = unit_of_work(&dir);
        uow.begin().await.unwrap();
        uow.track_modified_file(&file).await.unwrap();
        write(&file, "fresh").await;

        uow.commit().await.unwrap();
        assert_eq!(read(&file).await, "fresh");
    }

    #[tokio::test]
    async fn tracking_outside_a_transaction_fails() {
        let dir = TempDir::new().unwrap();
        let mut uow = unit_of_work(&dir);
        let result = uow.track_modified_file(dir.path().join("x.md")).await;
        assert!(matches!(result, Err(StoreError::InvalidOperation { .. })));
    }

    #[tokio::test]
    async fn drop_while_active_restores_files_synchronously() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("article.md");
        write(&file, "v1").await;

        let mut uow = unit_of_work(&dir);
        uow.begin().await.unwrap();
        uow.track_modified_file(&file).await.unwrap();
        write(&file, "v2").await;

        drop(uow);
        assert_eq!(read(&file).await, "v1");
    }

    #[tokio::test]
    async fn same_file_name_in_different_directories_does_not_collide() {
        let dir = TempDir::new().unwrap();
        let sub_a = dir.path().join("a");
        let sub_b = dir.path().join("b");
        fs::create_dir_all(&sub_a).await.unwrap();
        fs::create_dir_all(&sub_b).await.unwrap();
        let file_a = sub_a.join("index.md");
        let file_b = sub_b.join("index.md");
        write(&file_a, "a-v1").await;
        write(&file_b, "b-v1").await;

        let mut uow = unit_of_work(&dir);
        uow.begin().await.unwrap();
        uow.track_modified_file(&file_a).await.unwrap();
        uow.track_modified_file(&file_b).await.unwrap();
        write(&file_a, "a-v2").await;
        write(&file_b, "b-v2").await;

        uow.rollback().await.unwrap();
        assert_eq!(read(&file_a).await, "a-v1");
        assert_eq!(read(&file_b).await, "b-v1");
    }
}

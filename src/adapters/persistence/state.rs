//! JSON File Store - Atomic Named Record Persistence
//!
//! Saves each named record to `<data_dir>/<name>.json` using atomic
//! writes (write to tmp file, then rename). A record on disk is always
//! either the old or the new version, never a partial write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::ports::repository::StateRepository;

/// Atomic JSON file store, one file per record.
pub struct JsonFileStore {
    /// Directory holding the record files.
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a new store in the given data directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, name: &str) -> Result<PathBuf> {
        anyhow::ensure!(
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "Invalid record name '{name}'"
        );
        Ok(self.dir.join(format!("{name}.json")))
    }
}

#[async_trait]
impl StateRepository for JsonFileStore {
    /// Returns `None` if the record was never saved (first startup).
    #[instrument(skip(self))]
    async fn load(&self, name: &str) -> Result<Option<String>> {
        let path = self.record_path(name)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            debug!(record = name, "No record file found, starting fresh");
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read record file {}", path.display()))?;

        debug!(record = name, bytes = json.len(), "Record loaded");
        Ok(Some(json))
    }

    /// Save a record atomically (tmp -> rename).
    #[instrument(skip(self, json))]
    async fn save(&self, name: &str, json: &str) -> Result<()> {
        let path = self.record_path(name)?;
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, json)
            .await
            .context("Failed to write tmp record file")?;

        fs::rename(&tmp_path, &path)
            .await
            .context("Failed to rename record file")?;

        info!(record = name, path = %path.display(), "Record saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self, name: &str) -> Result<()> {
        let path = self.record_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(record = name, "Record cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove record file {}", path.display())),
        }
    }

    /// Healthy when the data directory exists and is a directory.
    async fn is_healthy(&self) -> bool {
        fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();
        assert!(store.load("portfolio-store").await.unwrap().is_none());
        assert!(store.is_healthy().await);
    }

    #[tokio::test]
    async fn test_save_replaces_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        store.save("admin-store", r#"{"v":1}"#).await.unwrap();
        store.save("admin-store", r#"{"v":2}"#).await.unwrap();

        assert_eq!(
            store.load("admin-store").await.unwrap().as_deref(),
            Some(r#"{"v":2}"#)
        );
        assert!(!dir.path().join("admin-store.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();
        store.save("x", "{}").await.unwrap();
        store.clear("x").await.unwrap();
        store.clear("x").await.unwrap();
        assert!(store.load("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();
        assert!(store.save("../escape", "{}").await.is_err());
        assert!(store.load("").await.is_err());
    }

    #[tokio::test]
    async fn test_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let store = JsonFileStore::new(&nested).await.unwrap();
        assert_eq!(store.dir(), nested.as_path());
        assert!(store.is_healthy().await);
    }
}

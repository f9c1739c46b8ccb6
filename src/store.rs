//! Local key-value storage for custodian state
//!
//! The custodian persists three small string values under fixed names.
//! `KeyValueStore` is the seam to whatever local storage the host app
//! has; two implementations ship here: a JSON file and an in-memory map.

use crate::error::{PrivacyError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

/// Device-local string storage
///
/// Values never leave the device. Last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if never set or removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// JSON file-based store
///
/// All entries live in one JSON object on disk. Writes go to a temp file
/// and are renamed into place so a crash never leaves a torn file.
pub struct FileKeyValueStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(PrivacyError::storage(
                    self.path.display().to_string(),
                    format!("read failed: {}", e),
                ))
            }
        };

        serde_json::from_str(&json).map_err(|e| {
            PrivacyError::storage(self.path.display().to_string(), format!("parse failed: {}", e))
        })
    }

    async fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("tmp");

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                PrivacyError::storage(
                    parent.display().to_string(),
                    format!("create directory failed: {}", e),
                )
            })?;
        }

        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            PrivacyError::storage(tmp_path.display().to_string(), format!("write failed: {}", e))
        })?;

        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            PrivacyError::storage(
                self.path.display().to_string(),
                format!("rename from {} failed: {}", tmp_path.display(), e),
            )
        })?;

        tracing::debug!(path = %self.path.display(), count = entries.len(), "Store saved");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

/// In-memory store for testing
///
/// Lost on drop.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get_remove() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("encryption_key").await.unwrap(), None);

        store.set("encryption_key", "abc").await.unwrap();
        assert_eq!(store.get("encryption_key").await.unwrap().as_deref(), Some("abc"));

        store.set("encryption_key", "def").await.unwrap();
        assert_eq!(store.get("encryption_key").await.unwrap().as_deref(), Some("def"));
        assert_eq!(store.len().await, 1);

        store.remove("encryption_key").await.unwrap();
        store.remove("missing").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_memory_store_blocking() {
        let store = MemoryKeyValueStore::new();
        tokio_test::block_on(async {
            store.set("encryption_enabled", "false").await.unwrap();
            assert_eq!(
                store.get("encryption_enabled").await.unwrap().as_deref(),
                Some("false")
            );
        });
    }

    #[tokio::test]
    async fn test_file_store_set_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("privacy.json");
        let store = FileKeyValueStore::new(&path);

        store.set("encryption_key", "abc").await.unwrap();
        store.set("custom_keywords", "[\"falcon\"]").await.unwrap();
        assert!(path.exists());

        let reopened = FileKeyValueStore::new(&path);
        assert_eq!(reopened.get("encryption_key").await.unwrap().as_deref(), Some("abc"));
        assert_eq!(
            reopened.get("custom_keywords").await.unwrap().as_deref(),
            Some("[\"falcon\"]")
        );

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("custom_keywords"));
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("encryption_key").await.unwrap(), None);
        store.remove("encryption_key").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/privacy.json");
        let store = FileKeyValueStore::new(&path);

        store.set("encryption_enabled", "true").await.unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_file_store_atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("privacy.json");
        let store = FileKeyValueStore::new(&path);

        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("privacy.json"));

        store.set("custom_keywords", "[]").await.unwrap();
        store.remove("custom_keywords").await.unwrap();
        assert_eq!(store.get("custom_keywords").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("privacy.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileKeyValueStore::new(&path);
        assert!(matches!(
            store.get("encryption_key").await,
            Err(PrivacyError::Storage { .. })
        ));
    }
}

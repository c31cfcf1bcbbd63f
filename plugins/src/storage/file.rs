//! JSON-file backed `SecureStore`. One file holds every key; writes go through a
//! temp file and a rename so a crash never leaves a half-written session.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medport_core::api as core_api;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const FILE_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self, key: &str) -> Result<StoreFile, core_api::StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreFile::default())
            }
            Err(source) => {
                return Err(core_api::StorageError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(StoreFile::default());
        }
        serde_json::from_str(&raw).map_err(|err| {
            core_api::StorageError::Corrupt(format!("{}: {}", self.path.display(), err))
        })
    }

    /// Like `load`, but a corrupt file is replaced instead of blocking every write.
    /// Returns whether the contents were discarded.
    async fn load_for_write(&self, key: &str) -> Result<(StoreFile, bool), core_api::StorageError> {
        match self.load(key).await {
            Ok(file) => Ok((file, false)),
            Err(core_api::StorageError::Corrupt(reason)) => {
                tracing::warn!(
                    target: "medport.storage",
                    path = %self.path.display(),
                    reason = %reason,
                    "discarding corrupt session file"
                );
                Ok((StoreFile::default(), true))
            }
            Err(err) => Err(err),
        }
    }

    async fn save(&self, key: &str, mut file: StoreFile) -> Result<(), core_api::StorageError> {
        let io_err = |source| core_api::StorageError::Io {
            key: key.to_string(),
            source,
        };

        file.version = FILE_VERSION;
        file.updated_at = Some(Utc::now());
        let body = serde_json::to_string_pretty(&file)
            .map_err(|err| core_api::StorageError::Backend(err.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        restrict_permissions(&tmp).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl core_api::SecureStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, core_api::StorageError> {
        let _guard = self.lock.lock().await;
        let file = self.load(key).await?;
        Ok(file.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), core_api::StorageError> {
        let _guard = self.lock.lock().await;
        let (mut file, _) = self.load_for_write(key).await?;
        file.entries.insert(key.to_string(), value.to_string());
        tracing::trace!(target: "medport.storage", key = %key, "file store set");
        self.save(key, file).await
    }

    async fn delete(&self, key: &str) -> Result<(), core_api::StorageError> {
        let _guard = self.lock.lock().await;
        let (mut file, discarded) = self.load_for_write(key).await?;
        if file.entries.remove(key).is_none() && !discarded {
            return Ok(());
        }
        tracing::trace!(target: "medport.storage", key = %key, "file store delete");
        self.save(key, file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_api::SecureStore;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get("userToken").await.unwrap(), None);
        store.delete("userToken").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        {
            let store = FileStore::new(&path);
            store.set("userToken", "t1").await.unwrap();
            store.set("userId", "42").await.unwrap();
            store.delete("userId").await.unwrap();
        }

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("userToken").await.unwrap().as_deref(), Some("t1"));
        assert_eq!(reopened.get("userId").await.unwrap(), None);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert!(raw["updated_at"].is_string());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        let err = store.get("userToken").await.unwrap_err();
        assert!(matches!(err, core_api::StorageError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_write_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        store.set("userToken", "t1").await.unwrap();
        assert_eq!(store.get("userToken").await.unwrap().as_deref(), Some("t1"));
        assert_eq!(store.get("userId").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_repairs_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        store.delete("userToken").await.unwrap();
        assert_eq!(store.get("userToken").await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileStore::new(&path).set("userToken", "t1").await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

use super::store::KeyValueStore;
use super::validate_key;
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// On-disk shape of a single entry
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: String,
    updated_at: DateTime<Local>,
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a sibling temp file that is renamed into place, so a reader
/// never sees a half-written entry.
pub struct FilesystemStore {
    dir: PathBuf,
}

impl FilesystemStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default data directory (`~/.local/share/aiva` on Linux)
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("aiva"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })
    }
}

#[async_trait]
impl KeyValueStore for FilesystemStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.entry_path(key);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        let entry: StoredEntry =
            serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            })?;
        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.ensure_dir().await?;

        let entry = StoredEntry {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Local::now(),
        };
        let content =
            serde_json::to_string_pretty(&entry).map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            })?;

        let path = self.entry_path(key);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp_path, content)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| StorageError::Io { path, source })
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.entry_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

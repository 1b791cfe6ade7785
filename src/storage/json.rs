use super::{Storage, StorageError};
use crate::collection::MigratedCollection;
use crate::utils::{now_iso, STORAGE_SCHEMA_VERSION};
use crate::version::{Version, VersionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// One migrated version as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredVersion {
    pub id: String,
    pub hash: String,
    pub migrated_at: String,
}

/// The applied-versions document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Schema version for future migrations
    pub schema_version: u32,

    /// When the record was last modified
    pub updated_at: String,

    /// Migrated versions in the order they were applied
    pub versions: Vec<StoredVersion>,
}

impl VersionRecord {
    pub fn new() -> Self {
        Self {
            schema_version: STORAGE_SCHEMA_VERSION,
            updated_at: now_iso(),
            versions: Vec::new(),
        }
    }
}

impl Default for VersionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage backed by a JSON file.
///
/// Every write is a read-modify-write under an async mutex, written
/// atomically through a temp file and a rename.
pub struct JsonFileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record from disk. A missing file is an empty record.
    pub async fn read_record(&self) -> Result<VersionRecord, StorageError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(VersionRecord::new()),
            Err(e) => return Err(e.into()),
        };
        let record: VersionRecord = serde_json::from_str(&content)?;
        Ok(record)
    }

    /// Write the record without taking the lock (caller must hold it).
    async fn write_record_unlocked(&self, record: &VersionRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(record)?;
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn fetch_all(&self) -> Result<MigratedCollection, StorageError> {
        let record = self.read_record().await?;

        let mut collection = MigratedCollection::new();
        for stored in record.versions {
            let id = VersionId::parse(&stored.id);
            if id.hash() != stored.hash {
                return Err(StorageError::HashMismatch(stored.id));
            }
            collection.add(Arc::new(Version::detached(id, true)))?;
        }
        Ok(collection)
    }

    async fn save(&self, id: &VersionId) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;
        let mut record = self.read_record().await?;

        if record.versions.iter().any(|v| v.hash == id.hash()) {
            return Ok(false);
        }

        let now = now_iso();
        record.versions.push(StoredVersion {
            id: id.to_string(),
            hash: id.hash().to_string(),
            migrated_at: now.clone(),
        });
        record.updated_at = now;
        self.write_record_unlocked(&record).await?;

        debug!(version = %id, path = %self.path.display(), "Recorded version as migrated");
        Ok(true)
    }

    async fn delete(&self, id: &VersionId) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;
        let mut record = self.read_record().await?;

        let before = record.versions.len();
        record.versions.retain(|v| v.hash != id.hash());
        if record.versions.len() == before {
            return Ok(false);
        }

        record.updated_at = now_iso();
        self.write_record_unlocked(&record).await?;

        debug!(version = %id, path = %self.path.display(), "Removed version record");
        Ok(true)
    }
}

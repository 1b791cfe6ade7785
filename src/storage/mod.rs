//! Persistence of which versions have been migrated.
//!
//! The engine never talks to storage itself. Callers read the migrated set
//! before a run and write the changed-set back afterwards.

mod json;
mod memory;

pub use json::{JsonFileStorage, StoredVersion, VersionRecord};
pub use memory::MemoryStorage;

use crate::collection::{Collection, CollectionError, MigratedCollection};
use crate::version::{Version, VersionId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Collection error: {0}")]
    CollectionError(#[from] CollectionError),

    #[error("Stored hash for version {0} does not match its id")]
    HashMismatch(String),
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// All migrated versions. Returned versions carry no migration unit.
    async fn fetch_all(&self) -> Result<MigratedCollection, StorageError>;

    /// Record `id` as migrated. Returns false if it already was.
    async fn save(&self, id: &VersionId) -> Result<bool, StorageError>;

    /// Forget `id`. Returns false if it was not recorded.
    async fn delete(&self, id: &VersionId) -> Result<bool, StorageError>;

    /// Save or delete depending on the version's migrated flag.
    async fn update(&self, version: &Version) -> Result<bool, StorageError> {
        if version.is_migrated() {
            self.save(version.id()).await
        } else {
            self.delete(version.id()).await
        }
    }

    /// Apply `update` to every version of a changed-set. Returns how many
    /// records actually changed.
    async fn persist(&self, changed: &Collection) -> Result<usize, StorageError> {
        let mut count = 0;
        for version in changed.iter() {
            if self.update(version).await? {
                count += 1;
            }
        }
        Ok(count)
    }
}

use super::{Storage, StorageError};
use crate::collection::MigratedCollection;
use crate::version::{Version, VersionId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process storage, mainly for tests and embedding.
#[derive(Default)]
pub struct MemoryStorage {
    ids: Mutex<Vec<VersionId>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-loaded with `ids` as migrated.
    pub fn with_migrated<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<VersionId> = Vec::new();
        for id in ids {
            let id = VersionId::parse(id.as_ref());
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self {
            ids: Mutex::new(unique),
        }
    }

    /// Raw ids currently recorded, in insertion order.
    pub async fn ids(&self) -> Vec<String> {
        self.ids.lock().await.iter().map(|id| id.to_string()).collect()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn fetch_all(&self) -> Result<MigratedCollection, StorageError> {
        let ids = self.ids.lock().await;
        let versions = ids
            .iter()
            .map(|id| Arc::new(Version::detached(id.clone(), true)));
        Ok(MigratedCollection::from_versions(versions)?)
    }

    async fn save(&self, id: &VersionId) -> Result<bool, StorageError> {
        let mut ids = self.ids.lock().await;
        if ids.contains(id) {
            return Ok(false);
        }
        ids.push(id.clone());
        Ok(true)
    }

    async fn delete(&self, id: &VersionId) -> Result<bool, StorageError> {
        let mut ids = self.ids.lock().await;
        let before = ids.len();
        ids.retain(|existing| existing != id);
        Ok(ids.len() != before)
    }
}

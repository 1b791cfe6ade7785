//! Migration registry for managing the available migration units.

use super::types::{Migration, MigrationError};
use crate::collection::{Collection, CollectionError};
use crate::version::{Version, VersionComparator, VersionId};
use std::sync::Arc;

/// Registry of all available migrations.
///
/// The registry is the unit source: it knows which units exist, not which
/// have run. [`MigrationRegistry::fetch_all`] hands them out as a pending
/// collection that storage state is later layered onto.
pub struct MigrationRegistry {
    migrations: Vec<Arc<dyn Migration>>,
    comparator: VersionComparator,
}

impl MigrationRegistry {
    /// Create a new empty registry using the natural order.
    pub fn new() -> Self {
        Self::with_comparator(VersionComparator::natural())
    }

    /// Create a new empty registry with a custom order.
    pub fn with_comparator(comparator: VersionComparator) -> Self {
        Self {
            migrations: Vec::new(),
            comparator,
        }
    }

    /// Register a migration.
    ///
    /// Migrations are kept sorted by id after registration. Registering two
    /// units with the same id is an error.
    pub fn register(&mut self, migration: Arc<dyn Migration>) -> Result<(), MigrationError> {
        let id = VersionId::for_migration(migration.as_ref());
        if self
            .migrations
            .iter()
            .any(|m| VersionId::for_migration(m.as_ref()) == id)
        {
            return Err(CollectionError::AlreadyExists(id.to_string()).into());
        }

        self.migrations.push(migration);
        let comparator = self.comparator.clone();
        self.migrations.sort_by(|a, b| {
            comparator.compare_ids(
                &VersionId::for_migration(a.as_ref()),
                &VersionId::for_migration(b.as_ref()),
            )
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Ids of all registered units, in order.
    pub fn available_versions(&self) -> Vec<String> {
        self.migrations.iter().map(|m| m.id().to_string()).collect()
    }

    /// Every registered unit as a pending version, in order.
    pub fn fetch_all(&self) -> Collection {
        // ids were checked for uniqueness on registration
        let versions = self
            .migrations
            .iter()
            .map(|migration| Arc::new(Version::new(Arc::clone(migration), false)))
            .collect();
        Collection::from_parts(versions, self.comparator.clone())
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

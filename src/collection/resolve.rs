use super::types::{Collection, MigratedCollection};
use crate::version::{Version, VersionId};
use std::sync::Arc;

impl Collection {
    /// Resolve a target string to a version of this collection.
    ///
    /// An exact id always wins. Otherwise the aliases below are tried
    /// against the collection's default order:
    /// - `first`: the earliest version
    /// - `latest` / `last`: the newest version
    /// - `head`: the newest migrated version
    pub fn resolve(&self, target: &str) -> Option<Arc<Version>> {
        if let Some(version) = self.find(&VersionId::parse(target)) {
            return Some(Arc::clone(version));
        }

        let sorted = self.sorted();
        match target.to_lowercase().as_str() {
            "first" => sorted.first().cloned(),
            "latest" | "last" => sorted.last().cloned(),
            "head" => sorted.iter().rev().find(|v| v.is_migrated()).cloned(),
            _ => None,
        }
    }
}

/// Build the full working collection from the available units and the
/// ids storage reports as migrated.
///
/// Available units come out pending unless storage lists them. Stored ids
/// with no matching unit are kept as migrated, unlinked versions so they
/// stay visible; running them fails validation instead of being skipped.
pub fn hydrate(available: &Collection, migrated: &MigratedCollection) -> Collection {
    let mut versions: Vec<Arc<Version>> = available
        .iter()
        .map(|v| {
            let copy = v.duplicate();
            copy.set_migrated(migrated.contains(v.id()));
            Arc::new(copy)
        })
        .collect();

    for stored in migrated.as_collection().iter() {
        if !available.contains(stored.id()) {
            versions.push(Arc::new(stored.duplicate()));
        }
    }

    // orphans are only added for ids missing from `available`
    Collection::from_parts(versions, available.comparator().clone()).sorted()
}

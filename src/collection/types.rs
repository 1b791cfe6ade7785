use super::CollectionError;
use crate::version::{Version, VersionComparator, VersionId};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered, identity-unique set of versions.
///
/// Insertion order is kept until a sorted view is requested. `filter`,
/// `sort` and `merge` never touch the receiver; they return new
/// collections sharing the same `Arc<Version>` entries.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    versions: Vec<Arc<Version>>,
    index: HashMap<VersionId, usize>,
    comparator: VersionComparator,
}

impl Collection {
    /// Create an empty collection ordered by the natural comparator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with a custom default order.
    pub fn with_comparator(comparator: VersionComparator) -> Self {
        Self {
            versions: Vec::new(),
            index: HashMap::new(),
            comparator,
        }
    }

    /// Build a collection from versions, rejecting duplicate ids.
    pub fn from_versions<I>(versions: I) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = Arc<Version>>,
    {
        let mut collection = Self::new();
        for version in versions {
            collection.add(version)?;
        }
        Ok(collection)
    }

    /// Build from versions already known to have unique ids.
    pub(crate) fn from_parts(versions: Vec<Arc<Version>>, comparator: VersionComparator) -> Self {
        let index = versions
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id().clone(), i))
            .collect();
        Self {
            versions,
            index,
            comparator,
        }
    }

    /// Append a version. Fails if its id is already present.
    pub fn add(&mut self, version: Arc<Version>) -> Result<(), CollectionError> {
        if self.index.contains_key(version.id()) {
            return Err(CollectionError::AlreadyExists(version.id().to_string()));
        }
        self.index.insert(version.id().clone(), self.versions.len());
        self.versions.push(version);
        Ok(())
    }

    /// Insert or replace in place, keeping the original position on replace.
    fn upsert(&mut self, version: Arc<Version>) {
        match self.index.get(version.id()) {
            Some(&position) => self.versions[position] = version,
            None => {
                self.index.insert(version.id().clone(), self.versions.len());
                self.versions.push(version);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn contains(&self, id: &VersionId) -> bool {
        self.index.contains_key(id)
    }

    pub fn find(&self, id: &VersionId) -> Option<&Arc<Version>> {
        self.index.get(id).map(|&i| &self.versions[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Version>> {
        self.versions.iter()
    }

    pub fn first(&self) -> Option<&Arc<Version>> {
        self.versions.first()
    }

    pub fn last(&self) -> Option<&Arc<Version>> {
        self.versions.last()
    }

    /// Raw id values in collection order.
    pub fn ids(&self) -> Vec<String> {
        self.versions.iter().map(|v| v.id().to_string()).collect()
    }

    /// The default order of this collection.
    pub fn comparator(&self) -> &VersionComparator {
        &self.comparator
    }

    /// Versions matching `predicate`, in the current order.
    pub fn filter<F>(&self, predicate: F) -> Collection
    where
        F: Fn(&Version) -> bool,
    {
        let versions = self
            .versions
            .iter()
            .filter(|v| predicate(v))
            .cloned()
            .collect();
        Self::from_parts(versions, self.comparator.clone())
    }

    /// Stable sort by `comparator`.
    pub fn sort(&self, comparator: &VersionComparator) -> Collection {
        let mut versions = self.versions.clone();
        versions.sort_by(|a, b| comparator.compare(a, b));
        Self::from_parts(versions, self.comparator.clone())
    }

    /// Stable sort by the collection's default comparator.
    pub fn sorted(&self) -> Collection {
        self.sort(&self.comparator)
    }

    /// Union keyed by id. Entries of `other` replace entries of `self`
    /// with the same id; new ids are appended in `other`'s order.
    pub fn merge(&self, other: &Collection) -> Collection {
        let mut merged = self.clone();
        for version in other.iter() {
            merged.upsert(Arc::clone(version));
        }
        merged
    }

    /// Deep copy: every version gets its own migrated flag.
    pub fn snapshot(&self) -> Collection {
        let versions = self
            .versions
            .iter()
            .map(|v| Arc::new(v.duplicate()))
            .collect();
        Self::from_parts(versions, self.comparator.clone())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Arc<Version>;
    type IntoIter = std::slice::Iter<'a, Arc<Version>>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.iter()
    }
}

/// Collection whose members are all migrated.
///
/// This is the shape storage hands back: adding a pending version is an
/// error rather than a silent drop.
#[derive(Debug, Clone, Default)]
pub struct MigratedCollection {
    inner: Collection,
}

impl MigratedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_versions<I>(versions: I) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = Arc<Version>>,
    {
        let mut collection = Self::new();
        for version in versions {
            collection.add(version)?;
        }
        Ok(collection)
    }

    pub fn add(&mut self, version: Arc<Version>) -> Result<(), CollectionError> {
        if !version.is_migrated() {
            return Err(CollectionError::NotMigrated(version.id().to_string()));
        }
        self.inner.add(version)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, id: &VersionId) -> bool {
        self.inner.contains(id)
    }

    pub fn as_collection(&self) -> &Collection {
        &self.inner
    }

    pub fn into_collection(self) -> Collection {
        self.inner
    }
}

//! Version identity and the migrated/pending record of a single unit.

use crate::migration::Migration;
use crate::utils::compute_hash;
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Error types for version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Invalid version id: {0}")]
    InvalidId(String),
}

/// Stable identity of a migration unit.
///
/// The id keeps the raw value it was built from (used for ordering and
/// display) and a SHA-256 hash of it. Two ids are equal when their hashes
/// are equal.
#[derive(Debug, Clone)]
pub struct VersionId {
    raw: String,
    hash: String,
}

impl VersionId {
    /// Build an id from a scalar or structured value.
    ///
    /// `null` and `false` carry no identity and are rejected. Numbers use
    /// their decimal text, `true` becomes `"true"`, arrays and objects use
    /// their compact JSON encoding.
    pub fn from_value(value: &Value) -> Result<Self, VersionError> {
        let raw = match value {
            Value::Null => {
                return Err(VersionError::InvalidId(
                    "null cannot be used as a version id".to_string(),
                ))
            }
            Value::Bool(false) => {
                return Err(VersionError::InvalidId(
                    "false cannot be used as a version id".to_string(),
                ))
            }
            Value::Bool(true) => "true".to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Ok(Self::from_raw(raw))
    }

    /// Build an id from a string value.
    pub fn parse(s: &str) -> Self {
        Self::from_raw(s.to_string())
    }

    /// Derive the id of a migration unit from its fully-qualified identity.
    pub fn for_migration(migration: &dyn Migration) -> Self {
        Self::parse(migration.id())
    }

    fn from_raw(raw: String) -> Self {
        let hash = compute_hash(&raw);
        Self { raw, hash }
    }

    /// The value this id was built from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Hex-encoded SHA-256 of the raw value.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl PartialEq for VersionId {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for VersionId {}

impl Hash for VersionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A migration unit together with its identity and migrated flag.
///
/// Versions are shared through `Arc` between a collection and the views
/// derived from it, so the flag lives in an atomic: flipping it after a run
/// is visible from every view holding the same version.
pub struct Version {
    id: VersionId,
    migration: Option<Arc<dyn Migration>>,
    migrated: AtomicBool,
}

impl Version {
    /// Create a version for `migration` with the given migrated state.
    pub fn new(migration: Arc<dyn Migration>, migrated: bool) -> Self {
        Self {
            id: VersionId::for_migration(migration.as_ref()),
            migration: Some(migration),
            migrated: AtomicBool::new(migrated),
        }
    }

    /// Create a version that is only known by id (e.g. read back from
    /// storage before any unit has been linked to it).
    pub fn detached(id: VersionId, migrated: bool) -> Self {
        Self {
            id,
            migration: None,
            migrated: AtomicBool::new(migrated),
        }
    }

    pub fn id(&self) -> &VersionId {
        &self.id
    }

    /// The linked migration unit, if any.
    pub fn migration(&self) -> Option<&Arc<dyn Migration>> {
        self.migration.as_ref()
    }

    pub fn is_migrated(&self) -> bool {
        self.migrated.load(Ordering::SeqCst)
    }

    /// Flip the migrated flag. Only the runner calls this after a
    /// successful execution.
    pub(crate) fn set_migrated(&self, migrated: bool) {
        self.migrated.store(migrated, Ordering::SeqCst);
    }

    /// Copy of this version with an independent migrated flag.
    pub fn duplicate(&self) -> Self {
        Self {
            id: self.id.clone(),
            migration: self.migration.clone(),
            migrated: AtomicBool::new(self.is_migrated()),
        }
    }

    /// Copy of this version linked to `migration`, keeping id and flag.
    pub fn with_migration(&self, migration: Arc<dyn Migration>) -> Self {
        Self {
            id: self.id.clone(),
            migration: Some(migration),
            migrated: AtomicBool::new(self.is_migrated()),
        }
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Version")
            .field("id", &self.id.as_str())
            .field("linked", &self.migration.is_some())
            .field("migrated", &self.is_migrated())
            .finish()
    }
}

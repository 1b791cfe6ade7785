//! Types for the migration system.

use super::direction::Direction;
use super::options::Options;
use crate::collection::{Collection, CollectionError};
use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::version::VersionError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Error types for migration operations.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Version {version} failed validation: {}", join_messages(.broken))]
    ValidationFailed {
        version: String,
        broken: BTreeMap<String, String>,
    },

    #[error("Migration {version} failed going {direction}: {source}")]
    ExecutionFailed {
        version: String,
        direction: Direction,
        #[source]
        source: Box<MigrationError>,
    },

    #[error("Run interrupted after {} change(s): {source}", .changed.len())]
    Interrupted {
        changed: Collection,
        #[source]
        source: Box<MigrationError>,
    },

    #[error("{run}; recording partial progress failed: {storage}")]
    ProgressNotRecorded {
        run: Box<MigrationError>,
        #[source]
        storage: StorageError,
    },

    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Version error: {0}")]
    VersionError(#[from] VersionError),

    #[error("Collection error: {0}")]
    CollectionError(#[from] CollectionError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
}

impl MigrationError {
    /// Versions that changed before an interrupted run stopped.
    ///
    /// Callers persist these even though the run failed.
    pub fn changed(&self) -> Option<&Collection> {
        match self {
            MigrationError::Interrupted { changed, .. } => Some(changed),
            MigrationError::ProgressNotRecorded { run, .. } => run.changed(),
            _ => None,
        }
    }
}

fn join_messages(broken: &BTreeMap<String, String>) -> String {
    broken.values().cloned().collect::<Vec<_>>().join("; ")
}

/// Trait for a single migration unit.
///
/// Units must be reversible: `down` undoes what `up` did. Optional
/// capabilities are exposed through the `as_*` accessors so the runner can
/// query them without knowing the concrete type.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Fully-qualified identity of the unit. The version id is derived
    /// from it, so it must never change once the unit has been applied.
    fn id(&self) -> &str;

    /// Human-readable description of what this migration does.
    fn description(&self) -> &str {
        ""
    }

    /// Apply the migration.
    async fn up(&self) -> Result<(), MigrationError>;

    /// Revert the migration.
    async fn down(&self) -> Result<(), MigrationError>;

    /// Transaction hooks, if the unit supports them.
    fn as_transactional(&self) -> Option<&dyn Transactional> {
        None
    }

    /// Run-options hook, if the unit wants to see direction and flags.
    fn as_options_aware(&self) -> Option<&dyn OptionsAware> {
        None
    }
}

/// Transaction envelope around a unit's `up`/`down`.
#[async_trait]
pub trait Transactional: Send + Sync {
    async fn begin(&self) -> Result<(), MigrationError>;

    async fn finish(&self) -> Result<(), MigrationError>;

    /// Called with the error that stopped the run.
    async fn abort(&self, error: &MigrationError) -> Result<(), MigrationError>;
}

/// Receives the options of the run before `up`/`down` is called.
pub trait OptionsAware: Send + Sync {
    fn set_run_options(&self, options: &Options);
}

/// Result of a single directional run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Raw id of the resolved target version.
    pub target: String,
    pub direction: Direction,
    /// Ids whose migrated flag flipped, in execution order. For a dry run
    /// these are the ids that would run.
    pub changed: Vec<String>,
    pub dry_run: bool,
}

/// Result of a converge run.
#[derive(Debug, Clone)]
pub struct ConvergeReport {
    pub up_to: String,
    pub down_to: String,
    /// Ids now migrated.
    pub migrated: Vec<String>,
    /// Ids now reverted.
    pub reverted: Vec<String>,
    pub dry_run: bool,
}

/// One row of the status listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStatus {
    pub id: String,
    pub description: String,
    pub migrated: bool,
    /// False when storage knows the id but no unit is available for it.
    pub linked: bool,
}

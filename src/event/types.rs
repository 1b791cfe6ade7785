use crate::collection::Collection;
use crate::migration::{Options, Progress, RunContext};
use crate::version::VersionId;
use uuid::Uuid;

/// Payload of the collection-level events.
#[derive(Debug, Clone)]
pub struct CollectionEvent {
    pub run_id: Uuid,
    pub target: VersionId,
    pub options: Options,
    /// The full, unfiltered collection the pass was given.
    pub collection: Collection,
    /// Number of versions selected to run.
    pub scheduled: usize,
    /// `0 of scheduled` when starting, `scheduled of scheduled` when
    /// finished. `None` when nothing was scheduled.
    pub progress: Option<Progress>,
}

/// Payload of the per-version events.
#[derive(Debug, Clone)]
pub struct VersionEvent {
    pub version: VersionId,
    pub context: RunContext,
}

impl VersionEvent {
    pub fn new(version: VersionId, context: RunContext) -> Self {
        Self { version, context }
    }
}

#[derive(Debug, Clone)]
pub enum MigrationEvent {
    CollectionStarting(CollectionEvent),
    CollectionFinished(CollectionEvent),
    MigrationStarting(VersionEvent),
    MigrationFinished(VersionEvent),
    MigrationFailed { event: VersionEvent, error: String },
}

impl MigrationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MigrationEvent::CollectionStarting(_) => "collection.starting",
            MigrationEvent::CollectionFinished(_) => "collection.finished",
            MigrationEvent::MigrationStarting(_) => "migration.starting",
            MigrationEvent::MigrationFinished(_) => "migration.finished",
            MigrationEvent::MigrationFailed { .. } => "migration.failed",
        }
    }
}

//! Migration executor: loads state, runs passes, persists the result.

use super::collection_runner::CollectionRunner;
use super::converge::ConvergeEngine;
use super::direction::Direction;
use super::options::Options;
use super::registry::MigrationRegistry;
use super::types::{ConvergeReport, MigrationError, MigrationReport, VersionStatus};
use crate::collection::{hydrate, Collection};
use crate::event::EventSink;
use crate::storage::Storage;
use crate::version::Version;
use std::sync::Arc;
use tracing::{error, info};

/// Ties the unit source, storage and engine together.
///
/// Each call reads the migrated set from storage, layers it onto the
/// registered units, runs the requested pass and writes the changed-set
/// back. A failed pass still writes whatever changed before the failure.
pub struct MigrationExecutor {
    registry: Arc<MigrationRegistry>,
    storage: Arc<dyn Storage>,
    runner: Arc<CollectionRunner>,
}

impl MigrationExecutor {
    /// Create a new executor.
    pub fn new(
        registry: Arc<MigrationRegistry>,
        storage: Arc<dyn Storage>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            storage,
            runner: Arc::new(CollectionRunner::new(events)),
        }
    }

    /// The full working collection: registered units plus storage state.
    pub async fn load(&self) -> Result<Collection, MigrationError> {
        let migrated = self.storage.fetch_all().await?;
        Ok(hydrate(&self.registry.fetch_all(), &migrated))
    }

    pub async fn status(&self) -> Result<Vec<VersionStatus>, MigrationError> {
        let collection = self.load().await?;
        Ok(collection
            .iter()
            .map(|v| VersionStatus {
                id: v.id().to_string(),
                description: v
                    .migration()
                    .map(|m| m.description().to_string())
                    .unwrap_or_default(),
                migrated: v.is_migrated(),
                linked: v.migration().is_some(),
            })
            .collect())
    }

    /// What a pass towards `target` would run, without running it.
    pub async fn plan(&self, target: &str, options: &Options) -> Result<Collection, MigrationError> {
        let collection = self.load().await?;
        let target = resolve_target(&collection, target)?;
        Ok(CollectionRunner::schedule(&collection, &target, options))
    }

    /// Run a pass towards `target` and persist the versions that changed.
    pub async fn migrate(
        &self,
        target: &str,
        options: &Options,
    ) -> Result<MigrationReport, MigrationError> {
        let collection = self.load().await?;
        let target_version = resolve_target(&collection, target)?;

        if options.dry_run {
            let scheduled = CollectionRunner::schedule(&collection, &target_version, options);
            return Ok(MigrationReport {
                target: target_version.id().to_string(),
                direction: options.direction,
                changed: scheduled.ids(),
                dry_run: true,
            });
        }

        info!(
            target = %target_version.id(),
            direction = %options.direction,
            "Starting migration"
        );

        let result = self.runner.run(&collection, &target_version, options).await;
        let changed = self.persist_outcome(result).await?;

        info!(
            target = %target_version.id(),
            count = changed.len(),
            "Migration completed successfully"
        );

        Ok(MigrationReport {
            target: target_version.id().to_string(),
            direction: options.direction,
            changed: changed.ids(),
            dry_run: false,
        })
    }

    /// Bring everything up to `up_to` and everything from `down_to`
    /// onwards down, then persist the merged changed-set.
    pub async fn converge(
        &self,
        up_to: &str,
        down_to: &str,
        options: &Options,
    ) -> Result<ConvergeReport, MigrationError> {
        let collection = self.load().await?;
        let up_target = resolve_target(&collection, up_to)?;
        let down_target = resolve_target(&collection, down_to)?;

        if options.dry_run {
            let up = CollectionRunner::schedule(
                &collection,
                &up_target,
                &options.with_direction(Direction::Up),
            );
            let down = CollectionRunner::schedule(
                &collection,
                &down_target,
                &options.with_direction(Direction::Down),
            );
            return Ok(ConvergeReport {
                up_to: up_target.id().to_string(),
                down_to: down_target.id().to_string(),
                migrated: up.ids(),
                reverted: down.ids(),
                dry_run: true,
            });
        }

        let engine = ConvergeEngine::new(self.runner.clone());
        let result = engine
            .converge(&collection, &up_target, &down_target, options)
            .await;
        let changed = self.persist_outcome(result).await?;

        Ok(ConvergeReport {
            up_to: up_target.id().to_string(),
            down_to: down_target.id().to_string(),
            migrated: changed.filter(|v| v.is_migrated()).ids(),
            reverted: changed.filter(|v| !v.is_migrated()).ids(),
            dry_run: false,
        })
    }

    /// Write the changed-set of a pass, including the partial set carried
    /// by an interrupted one, then hand the pass result back. If the partial
    /// set cannot be written the caller gets both errors.
    async fn persist_outcome(
        &self,
        result: Result<Collection, MigrationError>,
    ) -> Result<Collection, MigrationError> {
        match result {
            Ok(changed) => {
                self.storage.persist(&changed).await?;
                Ok(changed)
            }
            Err(e) => {
                let changed = match e.changed() {
                    Some(changed) => changed,
                    None => return Err(e),
                };
                let pending = changed.len();
                let persisted = self.storage.persist(changed).await;
                match persisted {
                    Ok(_) => Err(e),
                    Err(storage) => {
                        error!(
                            error = %storage,
                            pending,
                            "Failed to record partial progress"
                        );
                        Err(MigrationError::ProgressNotRecorded {
                            run: Box::new(e),
                            storage,
                        })
                    }
                }
            }
        }
    }
}

fn resolve_target(collection: &Collection, target: &str) -> Result<Arc<Version>, MigrationError> {
    collection
        .resolve(target)
        .ok_or_else(|| MigrationError::InvalidArgument(format!("unknown target version '{}'", target)))
}

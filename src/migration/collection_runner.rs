//! Scheduling and execution of a whole pass over a collection.

use super::options::{Options, Progress, RunContext};
use super::runner::Runner;
use super::types::MigrationError;
use crate::collection::Collection;
use crate::event::{CollectionEvent, EventSink, MigrationEvent};
use crate::version::Version;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Runs one directional pass and hands back its changed-set.
///
/// This is the boundary the converge engine drives. [`CollectionRunner`]
/// is the in-process implementation.
#[async_trait]
pub trait PassHandler: Send + Sync {
    async fn run_pass(
        &self,
        collection: &Collection,
        target: &Version,
        options: &Options,
    ) -> Result<Collection, MigrationError>;
}

/// Computes the versions to run for a target and direction and runs them
/// one at a time, in order.
pub struct CollectionRunner {
    runner: Runner,
    events: Arc<dyn EventSink>,
}

impl CollectionRunner {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            runner: Runner::new(Arc::clone(&events)),
            events,
        }
    }

    /// The ordered subset of `collection` a pass towards `target` runs.
    ///
    /// A version is selected when it is not yet in the direction's end
    /// state (`direction.is_up() XOR migrated`) and does not lie past the
    /// target. For `Down` the comparator is reversed, so "not past the
    /// target" means "at or after it" in natural order and the result runs
    /// newest first. The target itself is always inside the bound.
    ///
    /// With `forced` the target is scheduled even when it is already in the
    /// direction's end state, so its unit runs again.
    pub fn schedule(collection: &Collection, target: &Version, options: &Options) -> Collection {
        let comparator = if options.direction.is_up() {
            collection.comparator().clone()
        } else {
            collection.comparator().reverse()
        };
        let up = options.direction.is_up();

        collection
            .filter(|v| {
                let eligible = up != v.is_migrated() || (options.forced && v.id() == target.id());
                eligible && comparator.compare(v, target) != Ordering::Greater
            })
            .sort(&comparator)
    }

    /// Run the scheduled versions in order.
    ///
    /// Stops at the first failure and returns `Interrupted`, which carries
    /// the versions that changed before it. Versions after the failing one
    /// are not attempted.
    pub async fn run(
        &self,
        collection: &Collection,
        target: &Version,
        options: &Options,
    ) -> Result<Collection, MigrationError> {
        let scheduled = Self::schedule(collection, target, options);
        let run_id = Uuid::new_v4();

        info!(
            run_id = %run_id,
            target = %target.id(),
            direction = %options.direction,
            scheduled = ?scheduled.ids(),
            "Scheduled migration pass"
        );

        let event = CollectionEvent {
            run_id,
            target: target.id().clone(),
            options: options.clone(),
            collection: collection.clone(),
            scheduled: scheduled.len(),
            progress: Progress::new(scheduled.len(), 0).ok(),
        };
        self.events
            .publish(&MigrationEvent::CollectionStarting(event.clone()));

        let mut changed = Collection::with_comparator(collection.comparator().clone());
        let total = scheduled.len();

        for (position, version) in scheduled.iter().enumerate() {
            let context = RunContext::new(run_id, options.clone(), Progress::new(total, position + 1)?);

            match self.runner.run_with_context(version, &context).await {
                Ok(true) => changed.add(Arc::clone(version))?,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        run_id = %run_id,
                        version = %version.id(),
                        completed = changed.len(),
                        skipped = total - position - 1,
                        "Stopping pass after failure"
                    );
                    return Err(MigrationError::Interrupted {
                        changed,
                        source: Box::new(e),
                    });
                }
            }
        }

        let mut finished = event;
        if let Some(progress) = finished.progress.as_mut() {
            progress.update(total)?;
        }
        self.events.publish(&MigrationEvent::CollectionFinished(finished));

        info!(
            run_id = %run_id,
            changed = changed.len(),
            "Migration pass completed"
        );

        Ok(changed)
    }
}

#[async_trait]
impl PassHandler for CollectionRunner {
    async fn run_pass(
        &self,
        collection: &Collection,
        target: &Version,
        options: &Options,
    ) -> Result<Collection, MigrationError> {
        self.run(collection, target, options).await
    }
}

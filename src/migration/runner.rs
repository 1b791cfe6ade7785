//! Execution of a single version inside its transaction envelope.

use super::direction::Direction;
use super::options::{Options, Progress, RunContext};
use super::types::MigrationError;
use crate::event::{EventSink, MigrationEvent, VersionEvent};
use crate::specification::{AggregateValidator, HasMigration, ReadyFor, Specification};
use crate::version::Version;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Runs one version's `up` or `down`.
///
/// Per call the version moves `pending -> running -> succeeded | aborted`.
/// On success the migrated flag is set to match the direction; on failure
/// the flag is left alone, the abort hook sees the error, and the error is
/// returned wrapped in `ExecutionFailed`.
pub struct Runner {
    events: Arc<dyn EventSink>,
}

impl Runner {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self { events }
    }

    /// Run a single version outside of a pass.
    pub async fn run(&self, version: &Version, options: &Options) -> Result<bool, MigrationError> {
        let context = RunContext::new(Uuid::new_v4(), options.clone(), Progress::new(1, 1)?);
        self.run_with_context(version, &context).await
    }

    /// Run a version as part of a pass. Returns whether the migrated flag
    /// changed.
    pub async fn run_with_context(
        &self,
        version: &Version,
        context: &RunContext,
    ) -> Result<bool, MigrationError> {
        let direction = context.options.direction;
        self.validator(&context.options).validate(version)?;

        let migration = version.migration().cloned().ok_or_else(|| {
            MigrationError::InvalidArgument(format!("version {} has no migration unit", version.id()))
        })?;
        let before = version.is_migrated();

        self.events.publish(&MigrationEvent::MigrationStarting(VersionEvent::new(
            version.id().clone(),
            context.clone(),
        )));

        if let Some(aware) = migration.as_options_aware() {
            aware.set_run_options(&context.options);
        }

        let transaction = migration.as_transactional();
        if let Some(tx) = transaction {
            if let Err(e) = tx.begin().await {
                // nothing to abort: the transaction never opened
                return Err(self.failed(version, context, e));
            }
        }

        let result = match direction {
            Direction::Up => migration.up().await,
            Direction::Down => migration.down().await,
        };
        let result = match (result, transaction) {
            (Ok(()), Some(tx)) => tx.finish().await,
            (other, _) => other,
        };

        if let Err(e) = result {
            if let Some(tx) = transaction {
                if let Err(abort_err) = tx.abort(&e).await {
                    error!(
                        version = %version.id(),
                        error = %abort_err,
                        "Abort hook failed"
                    );
                }
            }
            return Err(self.failed(version, context, e));
        }

        version.set_migrated(direction.is_up());
        debug!(version = %version.id(), direction = %direction, "Migration succeeded");

        self.events.publish(&MigrationEvent::MigrationFinished(VersionEvent::new(
            version.id().clone(),
            context.clone(),
        )));

        Ok(before != version.is_migrated())
    }

    fn validator(&self, options: &Options) -> AggregateValidator {
        let mut specs: Vec<Box<dyn Specification>> = vec![Box::new(HasMigration)];
        if !options.forced {
            specs.push(Box::new(ReadyFor(options.direction)));
        }
        AggregateValidator::new(specs)
    }

    fn failed(&self, version: &Version, context: &RunContext, error: MigrationError) -> MigrationError {
        error!(
            version = %version.id(),
            direction = %context.options.direction,
            error = %error,
            "Migration failed"
        );

        self.events.publish(&MigrationEvent::MigrationFailed {
            event: VersionEvent::new(version.id().clone(), context.clone()),
            error: error.to_string(),
        });

        MigrationError::ExecutionFailed {
            version: version.id().to_string(),
            direction: context.options.direction,
            source: Box::new(error),
        }
    }
}

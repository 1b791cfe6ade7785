//! Reconciles an upward and a downward pass into one changed-set.

use super::collection_runner::PassHandler;
use super::direction::Direction;
use super::options::Options;
use super::types::MigrationError;
use crate::collection::Collection;
use crate::version::Version;
use std::sync::Arc;
use tracing::info;

/// Runs an `Up` pass towards one target and a `Down` pass towards another
/// and merges the two changed-sets.
///
/// Each pass works on its own snapshot of the input collection, so neither
/// sees the other's flag changes. When an id shows up in both results the
/// `Down` pass, evaluated last, wins: its flag is the last one applied.
pub struct ConvergeEngine {
    handler: Arc<dyn PassHandler>,
}

impl ConvergeEngine {
    pub fn new(handler: Arc<dyn PassHandler>) -> Self {
        Self { handler }
    }

    pub async fn converge(
        &self,
        collection: &Collection,
        up_to: &Version,
        down_to: &Version,
        options: &Options,
    ) -> Result<Collection, MigrationError> {
        let up_options = options.with_direction(Direction::Up);
        let down_options = options.with_direction(Direction::Down);

        let migrated = self
            .handler
            .run_pass(&collection.snapshot(), up_to, &up_options)
            .await?;

        let reverted = match self
            .handler
            .run_pass(&collection.snapshot(), down_to, &down_options)
            .await
        {
            Ok(reverted) => reverted,
            Err(MigrationError::Interrupted { changed, source }) => {
                return Err(MigrationError::Interrupted {
                    changed: migrated.merge(&changed),
                    source,
                })
            }
            Err(e) => {
                return Err(MigrationError::Interrupted {
                    changed: migrated,
                    source: Box::new(e),
                })
            }
        };

        let merged = migrated.merge(&reverted);
        info!(
            up_to = %up_to.id(),
            down_to = %down_to.id(),
            migrated = migrated.len(),
            reverted = reverted.len(),
            total = merged.len(),
            "Converge completed"
        );

        Ok(merged)
    }
}

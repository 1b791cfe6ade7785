//! Migration scheduling and execution.
//!
//! # Overview
//!
//! - Units implement [`Migration`] with reversible `up()` and `down()`
//! - The [`MigrationRegistry`] holds the available units
//! - [`CollectionRunner`] picks the versions a pass towards a target needs
//!   and runs them in order through the [`Runner`]
//! - [`ConvergeEngine`] merges an upward and a downward pass
//! - [`MigrationExecutor`] loads storage state, runs passes and persists
//!   what changed, partial progress included
//!
//! # Usage
//!
//! ```ignore
//! let registry = create_registry(&config, base_dir)?;
//! let executor = MigrationExecutor::new(registry, storage, events);
//! let report = executor.migrate("latest", &Options::up()).await?;
//! ```

mod collection_runner;
mod command;
mod converge;
mod direction;
mod executor;
mod options;
mod registry;
mod runner;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use collection_runner::{CollectionRunner, PassHandler};
pub use command::CommandMigration;
pub use converge::ConvergeEngine;
pub use direction::Direction;
pub use executor::MigrationExecutor;
pub use options::{Options, Progress, RunContext};
pub use registry::MigrationRegistry;
pub use runner::Runner;
pub use types::{
    ConvergeReport, Migration, MigrationError, MigrationReport, OptionsAware, Transactional,
    VersionStatus,
};

use crate::config::TidemarkConfig;
use std::path::Path;
use std::sync::Arc;

/// Create a registry holding the command migrations declared in `config`.
///
/// Commands run from `base_dir`, normally the directory of the config file.
pub fn create_registry(
    config: &TidemarkConfig,
    base_dir: &Path,
) -> Result<Arc<MigrationRegistry>, MigrationError> {
    let mut registry = MigrationRegistry::new();

    for definition in &config.migrations {
        let migration = CommandMigration::new(definition.clone(), config.shell.clone())
            .with_working_dir(base_dir);
        registry.register(Arc::new(migration))?;
    }

    Ok(Arc::new(registry))
}

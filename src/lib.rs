pub mod collection;
pub mod config;
pub mod event;
pub mod migration;
pub mod specification;
pub mod storage;
pub mod utils;
pub mod version;

// Re-export commonly used types
pub use collection::{hydrate, Collection, CollectionError, MigratedCollection};
pub use config::{read_config, write_config, CommandMigrationDefinition, ConfigError, TidemarkConfig};
pub use event::{EventSink, MigrationEvent, NullEventSink, TracingEventSink};
pub use migration::{
    create_registry, CollectionRunner, CommandMigration, ConvergeEngine, ConvergeReport,
    Direction, Migration, MigrationError, MigrationExecutor, MigrationRegistry, MigrationReport,
    Options, OptionsAware, PassHandler, Progress, RunContext, Runner, Transactional,
    VersionStatus,
};
pub use specification::{AggregateValidator, Specification};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
pub use version::{Comparator, NaturalComparator, Version, VersionComparator, VersionError, VersionId};

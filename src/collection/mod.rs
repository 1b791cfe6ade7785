mod resolve;
mod types;

pub use resolve::hydrate;
pub use types::{Collection, MigratedCollection};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Version {0} is already in the collection")]
    AlreadyExists(String),

    #[error("Version {0} is not migrated and cannot join a migrated collection")]
    NotMigrated(String),
}

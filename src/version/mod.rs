//! Version identity and ordering.
//!
//! A [`VersionId`] is the stable, hash-backed identity of a migration unit.
//! A [`Version`] pairs that identity with the unit itself and a migrated
//! flag. [`VersionComparator`] orders versions and can be reversed for
//! downward traversals.

mod comparator;
mod types;

pub use comparator::{Comparator, NaturalComparator, VersionComparator};
pub use types::{Version, VersionError, VersionId};

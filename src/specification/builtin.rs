use super::Specification;
use crate::migration::Direction;
use crate::version::Version;

/// A migration unit is linked to the version.
pub struct HasMigration;

impl Specification for HasMigration {
    fn is_satisfied_by(&self, version: &Version) -> bool {
        version.migration().is_some()
    }

    fn message(&self) -> &'static str {
        "no migration unit is available for this version"
    }
}

/// Must be migrated.
pub struct IsMigrated;

impl Specification for IsMigrated {
    fn is_satisfied_by(&self, version: &Version) -> bool {
        version.is_migrated()
    }

    fn message(&self) -> &'static str {
        "version must be migrated"
    }
}

/// Must be pending.
pub struct IsPending;

impl Specification for IsPending {
    fn is_satisfied_by(&self, version: &Version) -> bool {
        !version.is_migrated()
    }

    fn message(&self) -> &'static str {
        "version must be pending"
    }
}

/// The version is not already in the end state of the direction:
/// pending for `Up`, migrated for `Down`.
pub struct ReadyFor(pub Direction);

impl Specification for ReadyFor {
    fn is_satisfied_by(&self, version: &Version) -> bool {
        self.0.is_up() != version.is_migrated()
    }

    fn message(&self) -> &'static str {
        match self.0 {
            Direction::Up => "version is already migrated",
            Direction::Down => "version is not migrated, nothing to revert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionId;

    #[test]
    fn test_ready_for_follows_direction() {
        let pending = Version::detached(VersionId::parse("1"), false);
        let migrated = Version::detached(VersionId::parse("2"), true);

        assert!(ReadyFor(Direction::Up).is_satisfied_by(&pending));
        assert!(!ReadyFor(Direction::Up).is_satisfied_by(&migrated));
        assert!(ReadyFor(Direction::Down).is_satisfied_by(&migrated));
        assert!(!ReadyFor(Direction::Down).is_satisfied_by(&pending));
    }

    #[test]
    fn test_state_specs() {
        let pending = Version::detached(VersionId::parse("1"), false);
        assert!(IsPending.is_satisfied_by(&pending));
        assert!(!IsMigrated.is_satisfied_by(&pending));
        assert!(!HasMigration.is_satisfied_by(&pending));
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert_ne!(IsMigrated.kind(), IsPending.kind());
        assert_eq!(
            ReadyFor(Direction::Up).kind(),
            ReadyFor(Direction::Down).kind()
        );
    }
}

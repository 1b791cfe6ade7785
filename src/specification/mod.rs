//! Pluggable predicates over a version.
//!
//! A [`Specification`] states one condition a version must meet before it
//! is run. The [`AggregateValidator`] holds at most one specification per
//! kind and reports every broken one at once, so a failing version comes
//! back with the full list of reasons.

mod builtin;

pub use builtin::{HasMigration, IsMigrated, IsPending, ReadyFor};

use crate::migration::MigrationError;
use crate::version::Version;
use std::collections::BTreeMap;

pub trait Specification: Send + Sync {
    /// Key used to de-duplicate specifications. Defaults to the concrete
    /// type name, so two instances of one type count as the same kind.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn is_satisfied_by(&self, version: &Version) -> bool;

    /// Message reported when the specification is broken.
    fn message(&self) -> &'static str;
}

/// Set of specifications, distinct by kind.
#[derive(Default)]
pub struct AggregateValidator {
    specs: BTreeMap<&'static str, Box<dyn Specification>>,
}

impl AggregateValidator {
    /// Build a validator. Later specifications replace earlier ones of the
    /// same kind.
    pub fn new(specs: Vec<Box<dyn Specification>>) -> Self {
        let mut validator = Self::default();
        for spec in specs {
            validator.add(spec);
        }
        validator
    }

    pub fn add(&mut self, spec: Box<dyn Specification>) {
        self.specs.insert(spec.kind(), spec);
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn is_valid(&self, version: &Version) -> bool {
        self.specs.values().all(|s| s.is_satisfied_by(version))
    }

    /// Kind → message for every specification `version` breaks.
    pub fn broken_specs(&self, version: &Version) -> BTreeMap<&'static str, &'static str> {
        self.specs
            .iter()
            .filter(|(_, spec)| !spec.is_satisfied_by(version))
            .map(|(kind, spec)| (*kind, spec.message()))
            .collect()
    }

    /// `Ok` when valid, otherwise a `ValidationFailed` carrying every
    /// broken message.
    pub fn validate(&self, version: &Version) -> Result<(), MigrationError> {
        let broken = self.broken_specs(version);
        if broken.is_empty() {
            return Ok(());
        }

        Err(MigrationError::ValidationFailed {
            version: version.id().to_string(),
            broken: broken
                .into_iter()
                .map(|(kind, message)| (kind.to_string(), message.to_string()))
                .collect(),
        })
    }
}

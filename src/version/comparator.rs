//! Ordering of versions.

use super::types::{Version, VersionId};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A total order over version ids.
pub trait Comparator: Send + Sync {
    fn compare(&self, a: &VersionId, b: &VersionId) -> Ordering;
}

/// Default order: numeric when both ids are unsigned integers, lexical
/// otherwise. Equal raw values with different hashes cannot occur, but the
/// hash is used as a last resort so the order is always total.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalComparator;

impl Comparator for NaturalComparator {
    fn compare(&self, a: &VersionId, b: &VersionId) -> Ordering {
        let by_value = match (a.as_str().parse::<u128>(), b.as_str().parse::<u128>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.as_str().cmp(b.as_str()),
        };
        by_value.then_with(|| a.hash().cmp(b.hash()))
    }
}

/// Shareable comparator handle with an orientation.
///
/// `reverse()` hands back a new handle around the same inner comparator,
/// so one comparator can be reused by any number of runs in either
/// direction.
#[derive(Clone)]
pub struct VersionComparator {
    inner: Arc<dyn Comparator>,
    reversed: bool,
}

impl VersionComparator {
    pub fn new(inner: Arc<dyn Comparator>) -> Self {
        Self {
            inner,
            reversed: false,
        }
    }

    /// Comparator using [`NaturalComparator`].
    pub fn natural() -> Self {
        Self::new(Arc::new(NaturalComparator))
    }

    pub fn reverse(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            reversed: !self.reversed,
        }
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn compare_ids(&self, a: &VersionId, b: &VersionId) -> Ordering {
        let ordering = self.inner.compare(a, b);
        if self.reversed {
            ordering.reverse()
        } else {
            ordering
        }
    }

    pub fn compare(&self, a: &Version, b: &Version) -> Ordering {
        self.compare_ids(a.id(), b.id())
    }
}

impl Default for VersionComparator {
    fn default() -> Self {
        Self::natural()
    }
}

impl fmt::Debug for VersionComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionComparator")
            .field("reversed", &self.reversed)
            .finish()
    }
}

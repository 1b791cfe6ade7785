//! Events emitted while a pass runs.
//!
//! The engine publishes to an [`EventSink`] passed in at construction.
//! Delivery is synchronous and fire-and-forget: a sink cannot fail a run.

mod sink;
mod types;

pub use sink::{NullEventSink, TracingEventSink};
pub use types::{CollectionEvent, MigrationEvent, VersionEvent};

pub trait EventSink: Send + Sync {
    fn publish(&self, event: &MigrationEvent);
}

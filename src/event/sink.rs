use super::{EventSink, MigrationEvent};
use tracing::{debug, error, info};

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _event: &MigrationEvent) {}
}

/// Turns events into structured log records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: &MigrationEvent) {
        match event {
            MigrationEvent::CollectionStarting(e) => info!(
                run_id = %e.run_id,
                target = %e.target,
                direction = %e.options.direction,
                scheduled = e.scheduled,
                total = e.collection.len(),
                "Starting migration pass"
            ),
            MigrationEvent::CollectionFinished(e) => info!(
                run_id = %e.run_id,
                target = %e.target,
                direction = %e.options.direction,
                "Migration pass finished"
            ),
            MigrationEvent::MigrationStarting(e) => info!(
                run_id = %e.context.run_id,
                version = %e.version,
                direction = %e.context.options.direction,
                "[{}/{}] Running migration",
                e.context.progress.current(),
                e.context.progress.total()
            ),
            MigrationEvent::MigrationFinished(e) => debug!(
                run_id = %e.context.run_id,
                version = %e.version,
                "[{}/{}] Migration finished",
                e.context.progress.current(),
                e.context.progress.total()
            ),
            MigrationEvent::MigrationFailed { event: e, error } => error!(
                run_id = %e.context.run_id,
                version = %e.version,
                error = %error,
                "[{}/{}] Migration failed",
                e.context.progress.current(),
                e.context.progress.total()
            ),
        }
    }
}

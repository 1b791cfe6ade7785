//! Scripted units and a recording sink shared by the engine's unit tests.

use super::options::Options;
use super::types::{Migration, MigrationError, OptionsAware, Transactional};
use crate::collection::Collection;
use crate::event::{EventSink, MigrationEvent};
use crate::version::Version;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Shared, ordered record of calls made by scripted units.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub struct ScriptedMigration {
    id: String,
    log: CallLog,
    fail_up: bool,
    fail_down: bool,
    fail_finish: bool,
    transactional: bool,
}

impl ScriptedMigration {
    pub fn new(id: &str, log: &CallLog) -> Self {
        Self {
            id: id.to_string(),
            log: Arc::clone(log),
            fail_up: false,
            fail_down: false,
            fail_finish: false,
            transactional: false,
        }
    }

    pub fn failing_up(mut self) -> Self {
        self.fail_up = true;
        self
    }

    pub fn failing_down(mut self) -> Self {
        self.fail_down = true;
        self
    }

    pub fn failing_finish(mut self) -> Self {
        self.fail_finish = true;
        self.transactional = true;
        self
    }

    pub fn transactional(mut self) -> Self {
        self.transactional = true;
        self
    }

    fn record(&self, call: &str) {
        self.log.lock().unwrap().push(format!("{}:{}", call, self.id));
    }
}

#[async_trait]
impl Migration for ScriptedMigration {
    fn id(&self) -> &str {
        &self.id
    }

    async fn up(&self) -> Result<(), MigrationError> {
        self.record("up");
        if self.fail_up {
            return Err(MigrationError::Failed(format!("up {} exploded", self.id)));
        }
        Ok(())
    }

    async fn down(&self) -> Result<(), MigrationError> {
        self.record("down");
        if self.fail_down {
            return Err(MigrationError::Failed(format!("down {} exploded", self.id)));
        }
        Ok(())
    }

    fn as_transactional(&self) -> Option<&dyn Transactional> {
        if self.transactional {
            Some(self)
        } else {
            None
        }
    }

    fn as_options_aware(&self) -> Option<&dyn OptionsAware> {
        Some(self)
    }
}

#[async_trait]
impl Transactional for ScriptedMigration {
    async fn begin(&self) -> Result<(), MigrationError> {
        self.record("begin");
        Ok(())
    }

    async fn finish(&self) -> Result<(), MigrationError> {
        self.record("finish");
        if self.fail_finish {
            return Err(MigrationError::Failed(format!("finish {} exploded", self.id)));
        }
        Ok(())
    }

    async fn abort(&self, _error: &MigrationError) -> Result<(), MigrationError> {
        self.record("abort");
        Ok(())
    }
}

impl OptionsAware for ScriptedMigration {
    fn set_run_options(&self, options: &Options) {
        self.record(&format!("options({})", options.direction));
    }
}

/// Collection of scripted units `ids`, with `migrated` ids flagged.
pub fn scripted_collection(ids: &[&str], migrated: &[&str], log: &CallLog) -> Collection {
    Collection::from_versions(ids.iter().map(|id| {
        Arc::new(Version::new(
            Arc::new(ScriptedMigration::new(id, log)),
            migrated.contains(id),
        ))
    }))
    .unwrap()
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MigrationEvent>>,
}

impl RecordingSink {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }

    pub fn events(&self) -> Vec<MigrationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: &MigrationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

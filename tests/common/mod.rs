#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tidemark::{
    Collection, EventSink, Migration, MigrationError, MigrationEvent, Transactional, Version,
    VersionId,
};

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Ordered record of every unit call, shared between units.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn push(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Ids touched by `step` ("up", "down", "abort", ...), in order.
    pub fn ids_for(&self, step: &str) -> Vec<String> {
        let prefix = format!("{}:", step);
        self.entries()
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(|s| s.to_string()))
            .collect()
    }
}

/// Unit that journals its calls and can be told to fail.
pub struct JournalMigration {
    id: String,
    journal: Journal,
    fail_up: bool,
    fail_down: bool,
    transactional: bool,
}

impl JournalMigration {
    pub fn new(id: &str, journal: &Journal) -> Self {
        Self {
            id: id.to_string(),
            journal: journal.clone(),
            fail_up: false,
            fail_down: false,
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

    pub fn transactional(mut self) -> Self {
        self.transactional = true;
        self
    }
}

#[async_trait]
impl Migration for JournalMigration {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "journal migration"
    }

    async fn up(&self) -> Result<(), MigrationError> {
        self.journal.push(format!("up:{}", self.id));
        if self.fail_up {
            return Err(MigrationError::Failed(format!("up {} failed", self.id)));
        }
        Ok(())
    }

    async fn down(&self) -> Result<(), MigrationError> {
        self.journal.push(format!("down:{}", self.id));
        if self.fail_down {
            return Err(MigrationError::Failed(format!("down {} failed", self.id)));
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
}

#[async_trait]
impl Transactional for JournalMigration {
    async fn begin(&self) -> Result<(), MigrationError> {
        self.journal.push(format!("begin:{}", self.id));
        Ok(())
    }

    async fn finish(&self) -> Result<(), MigrationError> {
        self.journal.push(format!("finish:{}", self.id));
        Ok(())
    }

    async fn abort(&self, error: &MigrationError) -> Result<(), MigrationError> {
        self.journal.push(format!("abort:{}", self.id));
        self.journal.push(format!("abort-reason:{}", error));
        Ok(())
    }
}

/// Collection of journal units; ids in `migrated` start migrated.
pub fn journal_collection(ids: &[&str], migrated: &[&str], journal: &Journal) -> Collection {
    Collection::from_versions(ids.iter().map(|id| {
        Arc::new(Version::new(
            Arc::new(JournalMigration::new(id, journal)),
            migrated.contains(id),
        ))
    }))
    .expect("ids should be unique")
}

/// Look up a version by raw id.
pub fn version(collection: &Collection, id: &str) -> Arc<Version> {
    Arc::clone(
        collection
            .find(&VersionId::parse(id))
            .expect("version should exist"),
    )
}

/// Raw ids of the migrated versions of a collection, in order.
pub fn migrated_ids(collection: &Collection) -> Vec<String> {
    collection.filter(|v| v.is_migrated()).ids()
}

/// Event sink keeping every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MigrationEvent>>,
}

impl RecordingSink {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: &MigrationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Write a config file declaring shell command migrations that create
/// and remove marker files named after each id.
pub async fn write_marker_config(dir: &Path, ids: &[&str]) -> std::path::PathBuf {
    let migrations = ids
        .iter()
        .map(|id| tidemark::CommandMigrationDefinition {
            id: id.to_string(),
            description: format!("marker {}", id),
            up: format!("touch marker-{}", id),
            down: format!("rm marker-{}", id),
            begin: None,
            finish: None,
            abort: None,
        })
        .collect();

    let config = tidemark::TidemarkConfig {
        migrations,
        ..Default::default()
    };
    let path = dir.join("tidemark.json");
    tidemark::write_config(&path, &config)
        .await
        .expect("Should write config");
    path
}

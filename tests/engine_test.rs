mod common;

use common::{journal_collection, migrated_ids, version, Journal, JournalMigration, RecordingSink};
use std::sync::Arc;
use tidemark::{
    Collection, CollectionRunner, ConvergeEngine, Direction, MigrationError, NullEventSink,
    Options, Version, VersionId,
};

fn runner() -> CollectionRunner {
    CollectionRunner::new(Arc::new(NullEventSink))
}

#[tokio::test]
async fn test_up_to_target_runs_prefix_in_order() {
    let journal = Journal::default();
    let collection = journal_collection(&["1", "2", "3", "4", "5"], &[], &journal);

    let changed = runner()
        .run(&collection, &version(&collection, "3"), &Options::up())
        .await
        .expect("Should run");

    assert_eq!(changed.ids(), vec!["1", "2", "3"]);
    assert_eq!(journal.ids_for("up"), vec!["1", "2", "3"]);
    assert_eq!(migrated_ids(&collection), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_down_to_target_runs_descending_inclusive() {
    let journal = Journal::default();
    let collection = journal_collection(&["1", "2", "3", "4", "5"], &["1", "2", "3"], &journal);

    let changed = runner()
        .run(&collection, &version(&collection, "2"), &Options::down())
        .await
        .expect("Should run");

    assert_eq!(changed.ids(), vec!["3", "2"]);
    assert_eq!(journal.ids_for("down"), vec!["3", "2"]);
    assert_eq!(migrated_ids(&collection), vec!["1"]);
}

#[tokio::test]
async fn test_up_then_down_restores_flags() {
    let journal = Journal::default();
    let collection = journal_collection(&["1", "2", "3", "4", "5"], &["1"], &journal);
    let before = migrated_ids(&collection);

    let target = version(&collection, "4");
    let up = runner()
        .run(&collection, &target, &Options::up())
        .await
        .expect("Should run up");
    assert_eq!(up.ids(), vec!["2", "3", "4"]);

    // down to the lowest unit the up pass touched
    let down = runner()
        .run(&collection, &version(&collection, "2"), &Options::down())
        .await
        .expect("Should run down");
    assert_eq!(down.ids(), vec!["4", "3", "2"]);

    assert_eq!(migrated_ids(&collection), before);
}

#[tokio::test]
async fn test_never_reruns_applied_units() {
    let journal = Journal::default();
    let collection = journal_collection(&["1", "2", "3"], &["2"], &journal);

    runner()
        .run(&collection, &version(&collection, "3"), &Options::up())
        .await
        .expect("Should run");

    assert_eq!(journal.ids_for("up"), vec!["1", "3"]);

    // a second identical pass has nothing left to do
    let again = runner()
        .run(&collection, &version(&collection, "3"), &Options::up())
        .await
        .expect("Should run");
    assert!(again.is_empty());
    assert_eq!(journal.ids_for("up").len(), 2);
}

#[tokio::test]
async fn test_failure_stops_pass_and_keeps_earlier_changes() {
    let journal = Journal::default();
    let collection = Collection::from_versions(vec![
        Arc::new(Version::new(Arc::new(JournalMigration::new("1", &journal)), false)),
        Arc::new(Version::new(
            Arc::new(JournalMigration::new("2", &journal).transactional().failing_up()),
            false,
        )),
        Arc::new(Version::new(Arc::new(JournalMigration::new("3", &journal)), false)),
    ])
    .expect("Should build collection");

    let err = runner()
        .run(&collection, &version(&collection, "3"), &Options::up())
        .await
        .expect_err("Should fail");

    let changed = err.changed().expect("Should carry partial progress");
    assert_eq!(changed.ids(), vec!["1"]);
    assert_eq!(journal.ids_for("up"), vec!["1", "2"]);
    assert_eq!(journal.ids_for("abort"), vec!["2"]);
    assert!(journal
        .entries()
        .iter()
        .any(|e| e.starts_with("abort-reason:") && e.contains("up 2 failed")));
    assert_eq!(migrated_ids(&collection), vec!["1"]);

    match err {
        MigrationError::Interrupted { source, .. } => {
            assert!(matches!(
                *source,
                MigrationError::ExecutionFailed {
                    direction: Direction::Up,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_events_wrap_every_unit() {
    let journal = Journal::default();
    let collection = journal_collection(&["1", "2"], &[], &journal);
    let sink = Arc::new(RecordingSink::default());
    let runner = CollectionRunner::new(sink.clone());

    runner
        .run(&collection, &version(&collection, "2"), &Options::up())
        .await
        .expect("Should run");

    assert_eq!(
        sink.names(),
        vec![
            "collection.starting",
            "migration.starting",
            "migration.finished",
            "migration.starting",
            "migration.finished",
            "collection.finished",
        ]
    );
}

#[tokio::test]
async fn test_target_outside_collection_bounds_by_id() {
    let journal = Journal::default();
    let collection = journal_collection(&["10", "20", "30"], &[], &journal);
    let target = Version::detached(VersionId::parse("25"), false);

    let changed = runner()
        .run(&collection, &target, &Options::up())
        .await
        .expect("Should run");

    assert_eq!(changed.ids(), vec!["10", "20"]);
}

#[tokio::test]
async fn test_converge_scenario() {
    let journal = Journal::default();
    let collection = journal_collection(&["1", "2", "3", "4", "5"], &["3", "4", "5"], &journal);
    let engine = ConvergeEngine::new(Arc::new(runner()));

    let merged = engine
        .converge(
            &collection,
            &version(&collection, "2"),
            &version(&collection, "3"),
            &Options::up(),
        )
        .await
        .expect("Should converge");

    assert_eq!(merged.len(), 5);
    assert_eq!(migrated_ids(&merged), vec!["1", "2"]);
    assert_eq!(journal.ids_for("up"), vec!["1", "2"]);
    assert_eq!(journal.ids_for("down"), vec!["5", "4", "3"]);
}

#[tokio::test]
async fn test_converge_down_target_is_inclusive_lower_bound() {
    let journal = Journal::default();
    let collection = journal_collection(&["1", "2", "3", "4", "5"], &["3", "4", "5"], &journal);
    let engine = ConvergeEngine::new(Arc::new(runner()));

    let merged = engine
        .converge(
            &collection,
            &version(&collection, "2"),
            &version(&collection, "4"),
            &Options::up(),
        )
        .await
        .expect("Should converge");

    assert_eq!(merged.ids(), vec!["1", "2", "5", "4"]);
    assert!(journal.ids_for("down").iter().all(|id| id != "3"));
}

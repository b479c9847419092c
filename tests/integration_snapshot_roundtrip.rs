use autodev::task::model::{Priority, TaskDraft, TaskPatch, TaskStatus};
use autodev::task::snapshot::{FileSnapshot, SnapshotStore as _};
use autodev::task::store::TaskStore;

#[test]
fn reopening_a_store_reproduces_every_field() {
    let td = tempfile::tempdir().expect("tempdir");
    let path = td.path().join("tasks.json");

    let created = {
        let mut store = TaskStore::open(Box::new(FileSnapshot::new(path.clone())));
        let task = store.create(TaskDraft {
            title: "Write spec".to_owned(),
            description: "round-trip me".to_owned(),
            status: TaskStatus::Todo,
            priority: Priority::High,
        });
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        assert!(store.update(&task.id, &patch));
        store.tasks().to_vec()
    };

    let reopened = TaskStore::open(Box::new(FileSnapshot::new(path)));
    assert_eq!(reopened.tasks(), created.as_slice());

    let restored = reopened
        .tasks()
        .iter()
        .find(|t| t.title == "Write spec")
        .expect("created task survives reopen");
    assert_eq!(restored.status, TaskStatus::Completed);
    let completed_at = restored.completed_at.expect("completion stamp survives");
    assert!(completed_at >= restored.created_at);
}

#[test]
fn serialized_snapshot_is_stable_across_round_trips() {
    let td = tempfile::tempdir().expect("tempdir");
    let path = td.path().join("tasks.json");

    let mut store = TaskStore::open(Box::new(FileSnapshot::new(path.clone())));
    store.create(TaskDraft {
        title: "Stable".to_owned(),
        ..TaskDraft::default()
    });
    drop(store);

    let snap = FileSnapshot::new(path.clone());
    let first = snap.load().expect("load").expect("snapshot present");

    // Reopening without mutating rewrites the mirror; the bytes must not drift.
    let reopened = TaskStore::open(Box::new(FileSnapshot::new(path)));
    drop(reopened);
    let second = snap.load().expect("load").expect("snapshot present");
    assert_eq!(first, second);
}

#[test]
fn corrupt_snapshot_file_recovers_to_seed_data() {
    let td = tempfile::tempdir().expect("tempdir");
    let path = td.path().join("tasks.json");
    std::fs::write(&path, "{definitely not json").expect("write corrupt snapshot");

    let store = TaskStore::open(Box::new(FileSnapshot::new(path.clone())));
    assert_eq!(store.tasks().len(), 3);

    // The corrupt slot was overwritten with a parseable snapshot.
    let raw = std::fs::read_to_string(&path).expect("read");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("snapshot parses again");
    assert!(parsed.is_array());
}

#![forbid(unsafe_code)]

use time::OffsetDateTime;

use crate::task::model::{Priority, Task, TaskDraft, TaskPatch, TaskStatus, apply_patch};
use crate::task::snapshot::SnapshotStore;

/// Authoritative in-memory task collection for the session. The snapshot is
/// a serialized mirror kept in sync after every mutation; in-memory state
/// stays correct even when a write fails.
pub struct TaskStore {
    tasks: Vec<Task>,
    snapshot: Box<dyn SnapshotStore>,
}

impl TaskStore {
    /// Loads the persisted snapshot if one parses; otherwise seeds the
    /// demonstration tasks so a first run is never empty. A corrupt
    /// snapshot is discarded and overwritten on the next save.
    pub fn open(snapshot: Box<dyn SnapshotStore>) -> Self {
        let now = OffsetDateTime::now_utc();
        let tasks = match snapshot.load() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Task>>(&raw) {
                Ok(tasks) => tasks,
                Err(err) => {
                    eprintln!("task snapshot is corrupt, starting from seed data: {err}");
                    seed_tasks(now)
                }
            },
            Ok(None) => seed_tasks(now),
            Err(err) => {
                eprintln!("task snapshot unreadable, starting from seed data: {err}");
                seed_tasks(now)
            }
        };
        let store = Self { tasks, snapshot };
        store.persist();
        store
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Appends a new task in insertion order. Assigns id, creation time and
    /// spawn position; the completion derivation applies here the same way
    /// it does on update, so drafting a task directly as `completed` stamps
    /// `completed_at`.
    pub fn create(&mut self, draft: TaskDraft) -> Task {
        let now = OffsetDateTime::now_utc();
        let task = Task {
            id: Task::new_id(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            created_at: now,
            completed_at: (draft.status == TaskStatus::Completed).then_some(now),
            position: Task::spawn_position(),
        };
        self.tasks.push(task.clone());
        self.persist();
        task
    }

    /// Shallow patch over the record matching `id`. Unknown id is a silent
    /// no-op returning `false`; every other record is untouched.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let now = OffsetDateTime::now_utc();
        self.tasks[idx] = apply_patch(&self.tasks[idx], patch, now);
        self.persist();
        true
    }

    /// Permanent removal; no tombstone. Unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Best-effort mirror write. In-memory state is authoritative; a failed
    /// write is reported and never blocks or reverses the mutation.
    fn persist(&self) {
        let raw = match serde_json::to_string_pretty(&self.tasks) {
            Ok(raw) => raw,
            Err(err) => {
                eprintln!("failed to serialize task snapshot: {err}");
                return;
            }
        };
        if let Err(err) = self.snapshot.save(&raw) {
            eprintln!("failed to persist task snapshot: {err}");
        }
    }
}

/// Fixed demonstration set spanning all three statuses, with relative
/// timestamps so the dashboard reads as mid-flight.
fn seed_tasks(now: OffsetDateTime) -> Vec<Task> {
    let day = time::Duration::hours(24);
    let half_day = time::Duration::hours(12);
    vec![
        Task {
            id: "seed-env".to_owned(),
            title: "Setup 3D Environment".to_owned(),
            description: "Initialize the scene with camera and lighting".to_owned(),
            status: TaskStatus::Completed,
            priority: Priority::High,
            created_at: now - day,
            completed_at: Some(now - half_day),
            position: [-2.0, 1.0, 0.0],
        },
        Task {
            id: "seed-crud".to_owned(),
            title: "Implement Task CRUD".to_owned(),
            description: "Create, read, update, delete operations for tasks".to_owned(),
            status: TaskStatus::InProgress,
            priority: Priority::High,
            created_at: now - half_day,
            completed_at: None,
            position: [0.0, 1.0, 0.0],
        },
        Task {
            id: "seed-auth".to_owned(),
            title: "Design Authentication UI".to_owned(),
            description: "Create login and signup forms with validation".to_owned(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            created_at: now,
            completed_at: None,
            position: [2.0, 1.0, 0.0],
        },
    ]
}

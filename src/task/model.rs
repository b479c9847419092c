#![forbid(unsafe_code)]

use std::str::FromStr;

use rand::Rng as _;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AutodevError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = AutodevError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(AutodevError::InvalidStatus(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = AutodevError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AutodevError::InvalidPriority(other.to_owned())),
        }
    }
}

/// One unit of trackable work. `position` belongs to the visual layer and is
/// carried verbatim through every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub position: [f64; 3],
}

impl Task {
    #[must_use]
    pub fn new_id() -> String {
        let id = Uuid::new_v4().simple().to_string();
        id.chars().take(8).collect()
    }

    /// Spawn point inside the fixed bounding volume the scene expects:
    /// x in [-2, 2), y in [1, 3), z in [-1, 1).
    #[must_use]
    pub fn spawn_position() -> [f64; 3] {
        let mut rng = rand::rng();
        [
            rng.random_range(-2.0..2.0),
            rng.random_range(1.0..3.0),
            rng.random_range(-1.0..1.0),
        ]
    }
}

/// Caller-supplied creation fields. Non-empty trimmed `title` is a
/// precondition enforced at the CLI boundary, not here.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
}

/// Shallow per-field patch applied by `apply_patch`.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// Explicit override; wins over the completion derivation below.
    pub completed_at: Option<OffsetDateTime>,
}

/// Pure patch application. The one derived field: a transition into
/// `Completed` stamps `completed_at = now`. Leaving `Completed` retains the
/// old stamp (it records that the task finished at least once).
#[must_use]
pub fn apply_patch(task: &Task, patch: &TaskPatch, now: OffsetDateTime) -> Task {
    let mut next = task.clone();
    if let Some(title) = &patch.title {
        next.title.clone_from(title);
    }
    if let Some(description) = &patch.description {
        next.description.clone_from(description);
    }
    if let Some(priority) = patch.priority {
        next.priority = priority;
    }
    if let Some(status) = patch.status {
        if status == TaskStatus::Completed && task.status != TaskStatus::Completed {
            next.completed_at = Some(now);
        }
        next.status = status;
    }
    if let Some(at) = patch.completed_at {
        next.completed_at = Some(at);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: TaskStatus) -> Task {
        Task {
            id: Task::new_id(),
            title: "Write spec".to_owned(),
            description: String::new(),
            status,
            priority: Priority::High,
            created_at: OffsetDateTime::UNIX_EPOCH,
            completed_at: None,
            position: [0.5, 1.5, -0.5],
        }
    }

    #[test]
    fn completing_stamps_completed_at() {
        let task = sample(TaskStatus::Todo);
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::hours(1);
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        let next = apply_patch(&task, &patch, now);
        assert_eq!(next.status, TaskStatus::Completed);
        assert_eq!(next.completed_at, Some(now));
        assert!(next.completed_at.unwrap() >= next.created_at);
    }

    #[test]
    fn already_completed_keeps_original_stamp() {
        let mut task = sample(TaskStatus::Completed);
        let first = OffsetDateTime::UNIX_EPOCH + time::Duration::hours(1);
        task.completed_at = Some(first);
        let later = first + time::Duration::hours(1);
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        let next = apply_patch(&task, &patch, later);
        assert_eq!(next.completed_at, Some(first));
    }

    #[test]
    fn leaving_completed_retains_stamp() {
        let mut task = sample(TaskStatus::Completed);
        let stamp = OffsetDateTime::UNIX_EPOCH + time::Duration::hours(1);
        task.completed_at = Some(stamp);
        let patch = TaskPatch {
            status: Some(TaskStatus::Todo),
            ..TaskPatch::default()
        };
        let next = apply_patch(&task, &patch, stamp + time::Duration::hours(2));
        assert_eq!(next.status, TaskStatus::Todo);
        assert_eq!(next.completed_at, Some(stamp));
    }

    #[test]
    fn explicit_override_wins_over_derivation() {
        let task = sample(TaskStatus::Todo);
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::hours(3);
        let forced = OffsetDateTime::UNIX_EPOCH + time::Duration::hours(2);
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            completed_at: Some(forced),
            ..TaskPatch::default()
        };
        let next = apply_patch(&task, &patch, now);
        assert_eq!(next.completed_at, Some(forced));
    }

    #[test]
    fn unrelated_fields_pass_through() {
        let task = sample(TaskStatus::InProgress);
        let patch = TaskPatch {
            title: Some("Polish spec".to_owned()),
            ..TaskPatch::default()
        };
        let next = apply_patch(&task, &patch, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(next.title, "Polish spec");
        assert_eq!(next.status, TaskStatus::InProgress);
        assert_eq!(next.position, task.position);
        assert_eq!(next.id, task.id);
    }

    #[test]
    fn status_and_priority_parse_round_trip() {
        for s in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(s.as_str().parse::<TaskStatus>().unwrap(), s);
        }
        for p in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(p.as_str().parse::<Priority>().unwrap(), p);
        }
        assert!("urgent".parse::<Priority>().is_err());
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn spawn_position_stays_in_bounds() {
        for _ in 0..64 {
            let [x, y, z] = Task::spawn_position();
            assert!((-2.0..2.0).contains(&x));
            assert!((1.0..3.0).contains(&y));
            assert!((-1.0..1.0).contains(&z));
        }
    }
}

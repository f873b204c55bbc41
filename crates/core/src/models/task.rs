//! Task queue payloads

use serde::{Deserialize, Serialize};

use super::graph::at_least_one;
use super::{deserialize_id, deserialize_optional_id};
use crate::result::Result;

/// Task status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Done];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pick-and-drop job in the backend's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "node_id_pick", deserialize_with = "deserialize_id")]
    pub pick_node: String,
    #[serde(rename = "node_id_drop", deserialize_with = "deserialize_id")]
    pub drop_node: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(
        rename = "assigned_robot_id",
        default,
        deserialize_with = "deserialize_optional_id"
    )]
    pub assigned_robot_id: Option<String>,
}

impl Task {
    /// Creates a new pending, unassigned task
    pub fn new(
        id: impl Into<String>,
        pick_node: impl Into<String>,
        drop_node: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            pick_node: pick_node.into(),
            drop_node: drop_node.into(),
            status: TaskStatus::default(),
            assigned_robot_id: None,
        }
    }

    /// Builder pattern: set status
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder pattern: assign a robot
    #[must_use]
    pub fn with_robot(mut self, robot_id: impl Into<String>) -> Self {
        self.assigned_robot_id = Some(robot_id.into());
        self
    }
}

/// Body of `GET /tasks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Validated task count for `POST /generate_tasks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCount(u32);

impl TaskCount {
    /// Validate a raw user count.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when `count` is below 1.
    pub fn new(count: i64) -> Result<Self> {
        at_least_one("num_tasks", count).map(Self)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("t1", "4", "9");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.assigned_robot_id, None);
    }

    #[test]
    fn test_task_builder_pattern() {
        let task = Task::new("t2", "1", "2")
            .with_status(TaskStatus::InProgress)
            .with_robot("7");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assigned_robot_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_task_deserialization() -> std::result::Result<(), serde_json::Error> {
        let json = r#"{
            "tasks": [
                {"id": 0, "node_id_pick": 3, "node_id_drop": 8, "status": "Pending", "assigned_robot_id": -1},
                {"id": 1, "node_id_pick": 5, "node_id_drop": 2, "status": "InProgress", "assigned_robot_id": 0},
                {"id": 2, "node_id_pick": 6, "node_id_drop": 1, "status": "Done", "assigned_robot_id": null}
            ]
        }"#;

        let snapshot: TaskSnapshot = serde_json::from_str(json)?;
        assert_eq!(
            snapshot.tasks,
            vec![
                Task::new("0", "3", "8"),
                Task::new("1", "5", "2")
                    .with_status(TaskStatus::InProgress)
                    .with_robot("0"),
                Task::new("2", "6", "1").with_status(TaskStatus::Done),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"{"id": 0, "node_id_pick": 1, "node_id_drop": 2, "status": "Lost"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn test_task_count_gate() {
        assert_eq!(TaskCount::new(3).map(TaskCount::get).ok(), Some(3));
        assert!(TaskCount::new(0).is_err());
        assert!(TaskCount::new(-4).is_err());
    }

    #[test]
    fn test_status_display() {
        let names: Vec<String> = TaskStatus::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["Pending", "InProgress", "Done"]);
    }
}

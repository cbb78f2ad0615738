use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::ids::normalize_id;

/// A task record as returned by the API.
///
/// Same tolerance rules as [`Project`](crate::models::Project): raw ids,
/// optional descriptive fields, everything else preserved in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<Value>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Canonical string identifier; `_id` wins over `id` when both are
    /// present.
    pub fn id(&self) -> Option<String> {
        self.raw_id
            .as_ref()
            .and_then(normalize_id)
            .or_else(|| self.id.as_ref().and_then(normalize_id))
    }

    /// Stable display/selection key for row `index` of a rendered list.
    pub fn entity_key(&self, index: usize) -> String {
        self.id()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("task-{}", index))
    }

    /// Raw value of an unmodeled field, under either spelling the server
    /// uses.
    pub fn field(&self, snake: &str, camel: &str) -> Option<&Value> {
        self.extra.get(snake).or_else(|| self.extra.get(camel))
    }

    /// Owning project id, normalized.
    pub fn project_id(&self) -> Option<String> {
        self.field("project_id", "projectId").and_then(normalize_id)
    }

    /// Assignee id, normalized.
    pub fn assignee_id(&self) -> Option<String> {
        self.field("assignee_id", "assigneeId").and_then(normalize_id)
    }

    /// The status parsed into the workflow vocabulary, if it is one of the
    /// known states.
    pub fn parsed_status(&self) -> Option<TaskStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Workflow states a task moves through, in the order selection flows list
/// them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Blocked,
    InReview,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::InReview,
        TaskStatus::Done,
    ];

    /// Wire value, e.g. `in_progress`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::InReview => "in_review",
            TaskStatus::Done => "done",
        }
    }

    /// Human-facing label, e.g. `In Progress`.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::InReview => "In Review",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "blocked" => Ok(TaskStatus::Blocked),
            "in_review" => Ok(TaskStatus::InReview),
            "done" => Ok(TaskStatus::Done),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_ids_and_references_normalize() {
        let task: Task = serde_json::from_value(json!({
            "_id": {"$oid": "t1"},
            "title": "Ship it",
            "project_id": {"$oid": "p1"},
            "assignee_id": "u9",
            "status": "in_progress"
        }))
        .unwrap();

        assert_eq!(task.id().as_deref(), Some("t1"));
        assert_eq!(task.project_id().as_deref(), Some("p1"));
        assert_eq!(task.assignee_id().as_deref(), Some("u9"));
        assert_eq!(task.parsed_status(), Some(TaskStatus::InProgress));
    }

    #[test]
    fn camel_case_spelling_is_accepted_too() {
        let task: Task =
            serde_json::from_value(json!({"title": "A", "projectId": "p2"})).unwrap();
        assert_eq!(task.project_id().as_deref(), Some("p2"));
    }

    #[test]
    fn unknown_status_stays_raw() {
        let task: Task =
            serde_json::from_value(json!({"title": "A", "status": "someday"})).unwrap();
        assert_eq!(task.status.as_deref(), Some("someday"));
        assert_eq!(task.parsed_status(), None);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert_eq!(
            "nope".parse::<TaskStatus>(),
            Err(UnknownStatus("nope".to_string()))
        );
    }

    #[test]
    fn status_serializes_as_wire_value() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InReview).unwrap(),
            json!("in_review")
        );
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
    }
}

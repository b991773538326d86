//! To-do task domain model.
//!
//! # Responsibility
//! - Define the to-do item owned by exactly one project.
//!
//! # Invariants
//! - `id` is assigned at construction and never changes afterwards.
//! - Uniqueness of `id` is enforced by the owning project, not here.

use crate::model::project::ProjectStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque task identifier, unique within its owning project.
pub type TaskId = String;

/// Category of a to-do item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[serde(alias = "Task")]
    Task,
    #[serde(alias = "Issue")]
    Issue,
    #[serde(alias = "Meeting")]
    Meeting,
    #[serde(alias = "Milestone")]
    Milestone,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Issue => "issue",
            Self::Meeting => "meeting",
            Self::Milestone => "milestone",
        }
    }
}

impl Display for TaskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "issue" => Ok(Self::Issue),
            "meeting" => Ok(Self::Meeting),
            "milestone" => Ok(Self::Milestone),
            other => Err(format!(
                "unsupported task type `{other}`; expected task|issue|meeting|milestone"
            )),
        }
    }
}

/// Plain input record for creating or fully replacing a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    pub task_type: TaskType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: ProjectStatus,
}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    pub task_type: TaskType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: ProjectStatus,
}

impl Task {
    /// Creates a task with a freshly generated id.
    pub fn new(data: TaskData) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), data)
    }

    /// Creates a task under a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: impl Into<TaskId>, data: TaskData) -> Self {
        Self {
            id: id.into(),
            task_type: data.task_type,
            name: data.name,
            description: data.description,
            due_date: data.due_date,
            status: data.status,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Overwrites every mutable field; the id is kept.
    pub fn update(&mut self, data: TaskData) {
        self.task_type = data.task_type;
        self.name = data.name;
        self.description = data.description;
        self.due_date = data.due_date;
        self.status = data.status;
    }

    pub fn to_data(&self) -> TaskData {
        TaskData {
            task_type: self.task_type,
            name: self.name.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            status: self.status,
        }
    }
}

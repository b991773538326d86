//! Project domain model.
//!
//! # Responsibility
//! - Define the project record and its owned to-do sequence.
//! - Apply field-merge updates without touching the task sequence.
//!
//! # Invariants
//! - `id` is non-blank and immutable after construction.
//! - `name` satisfies [`check_project_name`]; uniqueness is the manager's job.
//! - `cost >= 0` and `0 <= progress <= 1`.
//! - Task ids are unique within one project.
//!
//! # See also
//! - `service::project_manager` for collection-level rules.

use crate::model::task::{Task, TaskData};
use crate::model::validation::{check_project_name, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque project identifier. Store-assigned ids are not necessarily UUIDs.
pub type ProjectId = String;

const INITIALS_PALETTE: [&str; 8] = [
    "#ca8134", "#37a3ae", "#8d5fd3", "#4f9d4f", "#d0504f", "#3b6fd1", "#b5973c", "#6b7a8f",
];

/// Lifecycle state shared by projects and their tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Active")]
    Active,
    #[serde(alias = "Finished")]
    Finished,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "finished" => Ok(Self::Finished),
            other => Err(format!(
                "unsupported status `{other}`; expected pending|active|finished"
            )),
        }
    }
}

/// Role the current user plays on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[serde(alias = "Architect")]
    Architect,
    #[serde(alias = "Engineer")]
    Engineer,
    #[serde(alias = "Developer")]
    Developer,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Architect => "architect",
            Self::Engineer => "engineer",
            Self::Developer => "developer",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "architect" => Ok(Self::Architect),
            "engineer" => Ok(Self::Engineer),
            "developer" => Ok(Self::Developer),
            other => Err(format!(
                "unsupported user role `{other}`; expected architect|engineer|developer"
            )),
        }
    }
}

/// Plain project record used as create input and as the snapshot body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    pub user_role: UserRole,
    pub created_date: DateTime<Utc>,
    pub finish_date: DateTime<Utc>,
    pub cost: f64,
    pub progress: f64,
    /// Serialized as `toDoList` to stay compatible with existing exports.
    #[serde(rename = "toDoList", default)]
    pub tasks: Vec<Task>,
}

impl ProjectData {
    /// Checks entity-level rules: name shape, numeric ranges, task ids.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_project_name(&self.name)?;
        check_cost(self.cost)?;
        check_progress(self.progress)?;

        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if task.id().trim().is_empty() {
                return Err(ValidationError::BlankId);
            }
            if !seen.insert(task.id()) {
                return Err(ValidationError::DuplicateTaskId(task.id().to_string()));
            }
        }
        Ok(())
    }
}

/// Field-merge update addressed to one project.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub id: ProjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub user_role: Option<UserRole>,
    pub created_date: Option<DateTime<Utc>>,
    pub finish_date: Option<DateTime<Utc>>,
    pub cost: Option<f64>,
    pub progress: Option<f64>,
}

impl ProjectPatch {
    pub fn new(id: impl Into<ProjectId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Builds a patch that overwrites every scalar field from `data`.
    ///
    /// Tasks in `data` are ignored; updates never alter the task sequence.
    pub fn full(id: impl Into<ProjectId>, data: &ProjectData) -> Self {
        Self {
            id: id.into(),
            name: Some(data.name.clone()),
            description: Some(data.description.clone()),
            status: Some(data.status),
            user_role: Some(data.user_role),
            created_date: Some(data.created_date),
            finish_date: Some(data.finish_date),
            cost: Some(data.cost),
            progress: Some(data.progress),
        }
    }
}

/// Serialized project: identifier plus the plain record.
///
/// A blank `id` marks a record that has never been assigned an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default)]
    pub id: ProjectId,
    #[serde(flatten)]
    pub data: ProjectData,
}

/// One tracked project and its to-do sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    id: ProjectId,
    name: String,
    description: String,
    status: ProjectStatus,
    user_role: UserRole,
    created_date: DateTime<Utc>,
    finish_date: DateTime<Utc>,
    cost: f64,
    progress: f64,
    tasks: Vec<Task>,
}

impl Project {
    /// Creates a project with a freshly generated id.
    pub fn new(data: ProjectData) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4().to_string(), data)
    }

    /// Creates a project under a caller-provided id.
    ///
    /// Used by store and import paths where identity already exists.
    pub fn with_id(id: impl Into<ProjectId>, data: ProjectData) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::BlankId);
        }
        data.validate()?;

        Ok(Self {
            id,
            name: data.name,
            description: data.description,
            status: data.status,
            user_role: data.user_role,
            created_date: data.created_date,
            finish_date: data.finish_date,
            cost: data.cost,
            progress: data.progress,
            tasks: data.tasks,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn finish_date(&self) -> DateTime<Utc> {
        self.finish_date
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Up to two uppercase letters derived from the name.
    ///
    /// Multi-word names use the first letter of the first two words;
    /// single-word names use their first two characters.
    pub fn initials(&self) -> String {
        let mut words = self.name.split_whitespace();
        let letters: Vec<char> = match (words.next(), words.next()) {
            (Some(first), Some(second)) => first
                .chars()
                .take(1)
                .chain(second.chars().take(1))
                .collect(),
            (Some(only), None) => only.chars().take(2).collect(),
            _ => Vec::new(),
        };
        letters.into_iter().flat_map(char::to_uppercase).collect()
    }

    /// Badge color derived deterministically from the name.
    pub fn color(&self) -> &'static str {
        // FNV-1a keeps the color stable across processes.
        let hash = self
            .name
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |acc, byte| {
                (acc ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            });
        INITIALS_PALETTE[(hash % INITIALS_PALETTE.len() as u64) as usize]
    }

    /// Merges every field present in `patch`.
    ///
    /// All present fields are validated before any is applied, so a failed
    /// update leaves the project unchanged. `patch.id` is not consulted.
    pub fn update(&mut self, patch: &ProjectPatch) -> Result<(), ValidationError> {
        if let Some(name) = &patch.name {
            check_project_name(name)?;
        }
        if let Some(cost) = patch.cost {
            check_cost(cost)?;
        }
        if let Some(progress) = patch.progress {
            check_progress(progress)?;
        }

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(user_role) = patch.user_role {
            self.user_role = user_role;
        }
        if let Some(created_date) = patch.created_date {
            self.created_date = created_date;
        }
        if let Some(finish_date) = patch.finish_date {
            self.finish_date = finish_date;
        }
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        Ok(())
    }

    /// Appends a new task with a fresh id and returns it.
    pub fn add_task(&mut self, data: TaskData) -> &Task {
        let index = self.tasks.len();
        self.tasks.push(Task::new(data));
        &self.tasks[index]
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == task_id)
    }

    /// Replaces a task's fields by id. Returns `None` when no task matches.
    pub fn update_task(&mut self, task_id: &str, data: TaskData) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|task| task.id() == task_id)?;
        task.update(data);
        Some(task)
    }

    /// Removes a task by id, preserving the order of the remaining tasks.
    pub fn remove_task(&mut self, task_id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id() == task_id)?;
        Some(self.tasks.remove(index))
    }

    pub fn to_data(&self) -> ProjectData {
        ProjectData {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            user_role: self.user_role,
            created_date: self.created_date,
            finish_date: self.finish_date,
            cost: self.cost,
            progress: self.progress,
            tasks: self.tasks.clone(),
        }
    }

    pub fn to_record(&self) -> ProjectRecord {
        ProjectRecord {
            id: self.id.clone(),
            data: self.to_data(),
        }
    }
}

fn check_cost(cost: f64) -> Result<(), ValidationError> {
    if cost >= 0.0 && cost.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidCost(cost))
    }
}

fn check_progress(progress: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&progress) {
        Ok(())
    } else {
        Err(ValidationError::InvalidProgress(progress))
    }
}

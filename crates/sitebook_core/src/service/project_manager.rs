//! In-memory project collection manager.
//!
//! # Responsibility
//! - Own the ordered project list and the current selection.
//! - Enforce eligibility (name rules + uniqueness) on every creation path.
//! - Publish created/deleted events to registered subscribers.
//!
//! # Invariants
//! - Project names are unique across the collection.
//! - Project ids are unique and never change.
//! - Events fire synchronously, after the mutation is committed.
//! - Deleting a project does not clear the selection id. `current_project()`
//!   re-resolves it, so callers holding a stale selection observe `None`.

use crate::model::project::{Project, ProjectData, ProjectId, ProjectPatch};
use crate::model::task::{Task, TaskData};
use crate::model::validation::{check_project_name, is_name_unique, ValidationError};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Handle returned by [`ProjectsManager::subscribe`].
pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&ProjectEvent)>;

/// Collection change published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvent {
    /// A project was admitted into the collection.
    Created(Project),
    /// A project was removed from the collection.
    Deleted(ProjectId),
}

/// Errors from collection manager operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerError {
    /// Input failed a validation or eligibility rule.
    Validation(ValidationError),
    /// No project has the requested id.
    ProjectNotFound(ProjectId),
    /// The project exists but has no task with the requested id.
    TaskNotFound {
        project_id: ProjectId,
        task_id: String,
    },
    /// An explicit id is already used by another project.
    DuplicateId(ProjectId),
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TaskNotFound {
                project_id,
                task_id,
            } => write!(f, "task {task_id} not found in project {project_id}"),
            Self::DuplicateId(id) => write!(f, "project id already in use: {id}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ManagerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl ManagerError {
    /// Stable machine-readable code, safe to log without user content.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::ProjectNotFound(_) => "project_not_found",
            Self::TaskNotFound { .. } => "task_not_found",
            Self::DuplicateId(_) => "duplicate_id",
        }
    }
}

/// In-memory registry mediating all project access.
#[derive(Default)]
pub struct ProjectsManager {
    projects: Vec<Project>,
    current_project_id: Option<ProjectId>,
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
    next_subscription_id: SubscriptionId,
}

impl ProjectsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects in insertion order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Runs the eligibility check: name length, first character, uniqueness.
    ///
    /// # Errors
    /// - Returns the first violated rule, in that order.
    pub fn verify_eligibility(&self, data: &ProjectData) -> Result<(), ValidationError> {
        check_project_name(&data.name)?;
        if !is_name_unique(&data.name, self.projects.iter().map(Project::name)) {
            return Err(ValidationError::DuplicateName {
                name: data.name.clone(),
            });
        }
        Ok(())
    }

    /// Validates and registers a project under a freshly generated id.
    pub fn create_project(&mut self, data: ProjectData) -> Result<Project, ManagerError> {
        let result = self
            .verify_eligibility(&data)
            .map_err(ManagerError::from)
            .and_then(|()| Project::new(data).map_err(ManagerError::from));
        self.admit(result)
    }

    /// Validates and registers a project under a caller-provided id.
    ///
    /// Surrounding whitespace is trimmed from `id` before any lookup.
    ///
    /// # Errors
    /// - `DuplicateId` when another project already uses `id`.
    /// - `Validation` for eligibility or entity rule violations.
    pub fn create_project_with_id(
        &mut self,
        data: ProjectData,
        id: impl Into<ProjectId>,
    ) -> Result<Project, ManagerError> {
        let id = id.into().trim().to_string();
        let result = if self.find_by_id(&id).is_some() {
            Err(ManagerError::DuplicateId(id))
        } else {
            self.verify_eligibility(&data)
                .map_err(ManagerError::from)
                .and_then(|()| Project::with_id(id, data).map_err(ManagerError::from))
        };
        self.admit(result)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id() == id)
    }

    /// Merges `patch` into the project addressed by `patch.id`.
    ///
    /// A rename must keep the name unique among the other projects.
    pub fn update_project_data(&mut self, patch: &ProjectPatch) -> Result<(), ManagerError> {
        let index = self.position(&patch.id)?;

        if let Some(name) = &patch.name {
            let others = self
                .projects
                .iter()
                .enumerate()
                .filter(|(other_index, _)| *other_index != index)
                .map(|(_, project)| project.name());
            if !is_name_unique(name, others) {
                let err = ValidationError::DuplicateName { name: name.clone() };
                warn!(
                    "event=project_update module=manager status=rejected project_id={} error_code={}",
                    patch.id,
                    err.code()
                );
                return Err(err.into());
            }
        }

        if let Err(err) = self.projects[index].update(patch) {
            warn!(
                "event=project_update module=manager status=rejected project_id={} error_code={}",
                patch.id,
                err.code()
            );
            return Err(err.into());
        }

        info!(
            "event=project_update module=manager status=ok project_id={}",
            patch.id
        );
        Ok(())
    }

    /// Removes a project by id. Returns `false` (no-op) when absent.
    pub fn delete_project(&mut self, id: &str) -> bool {
        let Some(index) = self.projects.iter().position(|project| project.id() == id) else {
            return false;
        };

        self.projects.remove(index);
        info!("event=project_delete module=manager status=ok project_id={id}");
        self.publish(&ProjectEvent::Deleted(id.to_string()));
        true
    }

    /// Case-insensitive substring match on name or description.
    ///
    /// Returns a snapshot in collection order; an empty query matches all.
    pub fn filter(&self, query: &str) -> Vec<Project> {
        let needle = query.to_lowercase();
        self.projects
            .iter()
            .filter(|project| {
                project.name().to_lowercase().contains(&needle)
                    || project.description().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Appends a new task to a project and returns it.
    pub fn add_task(&mut self, project_id: &str, data: TaskData) -> Result<Task, ManagerError> {
        let index = self.position(project_id)?;
        let task = self.projects[index].add_task(data).clone();
        info!(
            "event=task_add module=manager status=ok project_id={project_id} task_id={}",
            task.id()
        );
        Ok(task)
    }

    /// Replaces a task's fields by id.
    pub fn update_task(
        &mut self,
        project_id: &str,
        task_id: &str,
        data: TaskData,
    ) -> Result<(), ManagerError> {
        let index = self.position(project_id)?;
        match self.projects[index].update_task(task_id, data) {
            Some(_) => Ok(()),
            None => Err(ManagerError::TaskNotFound {
                project_id: project_id.to_string(),
                task_id: task_id.to_string(),
            }),
        }
    }

    /// Removes a task by id and returns it.
    pub fn remove_task(&mut self, project_id: &str, task_id: &str) -> Result<Task, ManagerError> {
        let index = self.position(project_id)?;
        let task = self.projects[index]
            .remove_task(task_id)
            .ok_or_else(|| ManagerError::TaskNotFound {
                project_id: project_id.to_string(),
                task_id: task_id.to_string(),
            })?;
        info!("event=task_remove module=manager status=ok project_id={project_id} task_id={task_id}");
        Ok(task)
    }

    /// Marks a project as the current selection.
    pub fn select_project(&mut self, id: &str) -> Result<(), ManagerError> {
        self.position(id)?;
        self.current_project_id = Some(id.to_string());
        Ok(())
    }

    /// Resolves the current selection; `None` if unset or since deleted.
    pub fn current_project(&self) -> Option<&Project> {
        let id = self.current_project_id.as_deref()?;
        self.find_by_id(id)
    }

    /// Raw selection id, which may refer to a deleted project.
    pub fn current_project_id(&self) -> Option<&str> {
        self.current_project_id.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.current_project_id = None;
    }

    /// Registers a change subscriber. Subscribers run in registration order.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&ProjectEvent) + 'static,
    {
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;
        self.subscribers.insert(id, Box::new(subscriber));
        id
    }

    /// Removes a subscriber. Returns `false` when the handle is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn admit(&mut self, result: Result<Project, ManagerError>) -> Result<Project, ManagerError> {
        let project = match result {
            Ok(project) => project,
            Err(err) => {
                warn!(
                    "event=project_create module=manager status=rejected error_code={}",
                    err.code()
                );
                return Err(err);
            }
        };

        self.projects.push(project.clone());
        info!(
            "event=project_create module=manager status=ok project_id={} task_count={}",
            project.id(),
            project.tasks().len()
        );
        self.publish(&ProjectEvent::Created(project.clone()));
        Ok(project)
    }

    fn position(&self, id: &str) -> Result<usize, ManagerError> {
        self.projects
            .iter()
            .position(|project| project.id() == id)
            .ok_or_else(|| ManagerError::ProjectNotFound(id.to_string()))
    }

    fn publish(&mut self, event: &ProjectEvent) {
        for subscriber in self.subscribers.values_mut() {
            subscriber(event);
        }
    }
}

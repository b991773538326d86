//! Persisting project use-case service.
//!
//! # Responsibility
//! - Combine the in-memory manager with a record store.
//! - Provide the create/update/load flows a presentation layer calls.
//!
//! # Invariants
//! - Creation validates before the store is touched.
//! - In-memory state is authoritative: a failed store write is reported but
//!   the applied in-memory change is kept.
//! - Store-sourced records enter through the import path, never by direct
//!   field mutation.
//! - Deletion is local only; the store contract has no delete operation.

use crate::model::project::{Project, ProjectData, ProjectPatch, ProjectRecord};
use crate::model::task::{Task, TaskData};
use crate::model::validation::ValidationError;
use crate::repo::record_store::{RecordStore, StoreError, PROJECTS_COLLECTION};
use crate::service::project_manager::{ManagerError, ProjectsManager};
use crate::service::snapshot::{ImportFailure, ImportReport, SnapshotError};
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for persisting project use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// Manager refused the operation.
    Manager(ManagerError),
    /// Record store failure.
    Store(StoreError),
    /// Snapshot payload could not be read.
    Snapshot(SnapshotError),
    /// Project could not be encoded as a record body.
    Encode(serde_json::Error),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manager(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "record store error: {err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode project record: {err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Manager(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<ManagerError> for ProjectServiceError {
    fn from(value: ManagerError) -> Self {
        Self::Manager(value)
    }
}

impl From<ValidationError> for ProjectServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Manager(ManagerError::Validation(value))
    }
}

impl From<StoreError> for ProjectServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<SnapshotError> for ProjectServiceError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<serde_json::Error> for ProjectServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

pub type ServiceResult<T> = Result<T, ProjectServiceError>;

/// Project service facade over a manager and a record store.
pub struct ProjectService<S: RecordStore> {
    manager: ProjectsManager,
    store: S,
}

impl<S: RecordStore> ProjectService<S> {
    /// Creates a service with an empty manager.
    pub fn new(store: S) -> Self {
        Self::with_manager(ProjectsManager::new(), store)
    }

    /// Creates a service around an existing manager (keeps its subscribers).
    pub fn with_manager(manager: ProjectsManager, store: S) -> Self {
        Self { manager, store }
    }

    pub fn manager(&self) -> &ProjectsManager {
        &self.manager
    }

    /// Mutable manager access for subscriptions and selection.
    ///
    /// Mutations made directly through the manager are not persisted.
    pub fn manager_mut(&mut self) -> &mut ProjectsManager {
        &mut self.manager
    }

    /// Validates, stores, then registers a new project under the store id.
    pub fn create_project(&mut self, data: ProjectData) -> ServiceResult<Project> {
        self.manager.verify_eligibility(&data)?;
        data.validate()?;

        let body = serde_json::to_value(&data)?;
        let id = self.store.add_record(PROJECTS_COLLECTION, &body)?;
        let project = self.manager.create_project_with_id(data, id)?;
        Ok(project)
    }

    /// Merges a patch in memory, then writes the full project through.
    pub fn update_project(&mut self, patch: &ProjectPatch) -> ServiceResult<()> {
        self.manager.update_project_data(patch)?;
        self.persist(&patch.id)
    }

    /// Removes a project from memory. Returns `false` when absent.
    pub fn delete_project(&mut self, id: &str) -> bool {
        self.manager.delete_project(id)
    }

    pub fn add_task(&mut self, project_id: &str, data: TaskData) -> ServiceResult<Task> {
        let task = self.manager.add_task(project_id, data)?;
        self.persist(project_id)?;
        Ok(task)
    }

    pub fn update_task(
        &mut self,
        project_id: &str,
        task_id: &str,
        data: TaskData,
    ) -> ServiceResult<()> {
        self.manager.update_task(project_id, task_id, data)?;
        self.persist(project_id)
    }

    pub fn remove_task(&mut self, project_id: &str, task_id: &str) -> ServiceResult<Task> {
        let task = self.manager.remove_task(project_id, task_id)?;
        self.persist(project_id)?;
        Ok(task)
    }

    /// Mirrors every stored project record into the manager.
    ///
    /// Known ids are updated, unknown ids are created under the stored id.
    /// Per-record failures are returned in the report.
    pub fn load_from_store(&mut self) -> ServiceResult<ImportReport> {
        let records = self.store.list_records(PROJECTS_COLLECTION)?;
        let count = records.len();
        let items: Vec<Value> = records
            .into_iter()
            .map(|record| {
                let mut body = record.body;
                if let Value::Object(fields) = &mut body {
                    fields.insert("id".to_string(), Value::String(record.id));
                }
                body
            })
            .collect();

        let report = self.manager.import_values(items);
        info!(
            "event=store_load module=service status=ok records={count} failed={}",
            report.failures.len()
        );
        Ok(report)
    }

    /// Imports records and writes every applied project through.
    ///
    /// A failed write does not stop the batch; it is reported as
    /// `ImportFailure::Unsaved` while the in-memory change stays applied.
    pub fn import_snapshot(&mut self, records: Vec<ProjectRecord>) -> ImportReport {
        let mut report = self.manager.import_snapshot(records);
        self.persist_applied(&mut report);
        report
    }

    /// Imports a JSON array payload and writes every applied project through.
    pub fn import_json(&mut self, payload: &str) -> ServiceResult<ImportReport> {
        let mut report = self.manager.import_json(payload)?;
        self.persist_applied(&mut report);
        Ok(report)
    }

    fn persist_applied(&self, report: &mut ImportReport) {
        let mut unsaved = Vec::new();
        for outcome in &report.applied {
            if let Err(err) = self.persist(outcome.project_id()) {
                unsaved.push(ImportFailure::Unsaved {
                    index: outcome.index(),
                    id: outcome.project_id().to_string(),
                    message: err.to_string(),
                });
            }
        }
        if unsaved.is_empty() {
            return;
        }

        warn!(
            "event=snapshot_persist module=service status=partial applied={} unsaved={}",
            report.applied.len(),
            unsaved.len()
        );
        report.failures.extend(unsaved);
        report.failures.sort_by_key(ImportFailure::index);
    }

    fn persist(&self, project_id: &str) -> ServiceResult<()> {
        let project = self
            .manager
            .find_by_id(project_id)
            .ok_or_else(|| ManagerError::ProjectNotFound(project_id.to_string()))?;
        let body = serde_json::to_value(project.to_data())?;

        if let Err(err) = self
            .store
            .update_record(PROJECTS_COLLECTION, project_id, &body)
        {
            error!(
                "event=store_write module=service status=error project_id={project_id} error={err}"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

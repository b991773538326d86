//! Snapshot export/import for the project collection.
//!
//! # Responsibility
//! - Dump the whole collection as an order-preserving list of records.
//! - Re-apply a list of records through the regular create/update paths.
//!
//! # Invariants
//! - Export followed by import into an empty manager reproduces the
//!   collection attribute-by-attribute, in the same order.
//! - One failing record never aborts the remaining records.
//! - Import never mutates project fields directly; every record goes through
//!   `create_project*` or `update_project_data`.

use crate::model::project::{ProjectId, ProjectPatch, ProjectRecord};
use crate::service::project_manager::{ManagerError, ProjectsManager};
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Payload-level failure that prevents any record from being processed.
#[derive(Debug)]
pub enum SnapshotError {
    /// Payload is not valid JSON, or serialization failed.
    Json(serde_json::Error),
    /// Payload is valid JSON but its top level is not an array.
    NotAnArray,
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid snapshot payload: {err}"),
            Self::NotAnArray => write!(f, "snapshot payload must be a JSON array of projects"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnArray => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// What happened to one successfully applied record.
///
/// `index` is the record position in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Created { index: usize, id: ProjectId },
    Updated { index: usize, id: ProjectId },
}

impl ImportOutcome {
    pub fn project_id(&self) -> &str {
        match self {
            Self::Created { id, .. } | Self::Updated { id, .. } => id,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Created { index, .. } | Self::Updated { index, .. } => *index,
        }
    }
}

/// Per-record import failure. `index` is the record position in the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportFailure {
    /// Record could not be decoded (missing field, wrong type, ...).
    Malformed { index: usize, message: String },
    /// Record decoded but the manager refused it.
    Rejected {
        index: usize,
        id: Option<ProjectId>,
        error: ManagerError,
    },
    /// Record was applied in memory but could not be written to the store.
    Unsaved {
        index: usize,
        id: ProjectId,
        message: String,
    },
}

impl ImportFailure {
    pub fn index(&self) -> usize {
        match self {
            Self::Malformed { index, .. }
            | Self::Rejected { index, .. }
            | Self::Unsaved { index, .. } => *index,
        }
    }
}

impl Display for ImportFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { index, message } => {
                write!(f, "record #{index} is malformed: {message}")
            }
            Self::Rejected {
                index,
                id: Some(id),
                error,
            } => write!(f, "record #{index} ({id}) rejected: {error}"),
            Self::Rejected {
                index,
                id: None,
                error,
            } => write!(f, "record #{index} rejected: {error}"),
            Self::Unsaved { index, id, message } => {
                write!(f, "record #{index} ({id}) applied but not saved: {message}")
            }
        }
    }
}

impl Error for ImportFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected { error, .. } => Some(error),
            Self::Malformed { .. } | Self::Unsaved { .. } => None,
        }
    }
}

/// Accumulated result of one import batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Applied records, in payload order.
    pub applied: Vec<ImportOutcome>,
    /// Failed records, in payload order.
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn created_count(&self) -> usize {
        self.applied
            .iter()
            .filter(|outcome| matches!(outcome, ImportOutcome::Created { .. }))
            .count()
    }

    pub fn updated_count(&self) -> usize {
        self.applied
            .iter()
            .filter(|outcome| matches!(outcome, ImportOutcome::Updated { .. }))
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ProjectsManager {
    /// Complete dump of the collection, in collection order.
    pub fn export_snapshot(&self) -> Vec<ProjectRecord> {
        self.projects().iter().map(|project| project.to_record()).collect()
    }

    /// Pretty-printed JSON form of [`ProjectsManager::export_snapshot`].
    pub fn export_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.export_snapshot())?)
    }

    /// Applies records one by one.
    ///
    /// - blank id: create with a generated id
    /// - id of an existing project: full field update (tasks untouched)
    /// - unknown id: create under that id
    pub fn import_snapshot(&mut self, records: Vec<ProjectRecord>) -> ImportReport {
        let mut report = ImportReport::default();
        for (index, record) in records.into_iter().enumerate() {
            self.import_record(index, record, &mut report);
        }
        log_import_summary(&report);
        report
    }

    /// Decodes a JSON array payload and imports it.
    ///
    /// Each element is decoded on its own, so a malformed element becomes a
    /// `Malformed` failure instead of rejecting the whole payload.
    ///
    /// # Errors
    /// - `SnapshotError::Json` when the payload is not JSON.
    /// - `SnapshotError::NotAnArray` when the top level is not an array.
    pub fn import_json(&mut self, payload: &str) -> Result<ImportReport, SnapshotError> {
        let Value::Array(items) = serde_json::from_str::<Value>(payload)? else {
            return Err(SnapshotError::NotAnArray);
        };
        Ok(self.import_values(items))
    }

    /// Imports already-parsed JSON records, decoding each independently.
    pub fn import_values(&mut self, items: Vec<Value>) -> ImportReport {
        let mut report = ImportReport::default();
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<ProjectRecord>(item) {
                Ok(record) => self.import_record(index, record, &mut report),
                Err(err) => report.failures.push(ImportFailure::Malformed {
                    index,
                    message: err.to_string(),
                }),
            }
        }
        log_import_summary(&report);
        report
    }

    fn import_record(&mut self, index: usize, record: ProjectRecord, report: &mut ImportReport) {
        let ProjectRecord { id, data } = record;
        let id = id.trim().to_string();

        let result = if id.is_empty() {
            self.create_project(data).map(|project| ImportOutcome::Created {
                index,
                id: project.id().to_string(),
            })
        } else if self.find_by_id(&id).is_some() {
            self.update_project_data(&ProjectPatch::full(id.clone(), &data))
                .map(|()| ImportOutcome::Updated {
                    index,
                    id: id.clone(),
                })
        } else {
            self.create_project_with_id(data, id.clone())
                .map(|project| ImportOutcome::Created {
                    index,
                    id: project.id().to_string(),
                })
        };

        match result {
            Ok(outcome) => report.applied.push(outcome),
            Err(error) => report.failures.push(ImportFailure::Rejected {
                index,
                id: (!id.is_empty()).then_some(id),
                error,
            }),
        }
    }
}

fn log_import_summary(report: &ImportReport) {
    if report.is_clean() {
        info!(
            "event=snapshot_import module=snapshot status=ok created={} updated={}",
            report.created_count(),
            report.updated_count()
        );
    } else {
        warn!(
            "event=snapshot_import module=snapshot status=partial created={} updated={} failed={}",
            report.created_count(),
            report.updated_count(),
            report.failures.len()
        );
    }
}

//! Core domain logic for sitebook.
//! This crate is the single source of truth for project/task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::project::{
    Project, ProjectData, ProjectId, ProjectPatch, ProjectRecord, ProjectStatus, UserRole,
};
pub use model::task::{Task, TaskData, TaskId, TaskType};
pub use model::validation::{
    check_project_name, is_name_unique, is_valid_project_name, parse_currency, parse_percentage,
    ValidationError, MIN_PROJECT_NAME_CHARS,
};
pub use repo::record_store::{
    RecordStore, SqliteRecordStore, StoreError, StoreResult, StoredRecord, PROJECTS_COLLECTION,
};
pub use service::project_manager::{ManagerError, ProjectEvent, ProjectsManager, SubscriptionId};
pub use service::project_service::{ProjectService, ProjectServiceError, ServiceResult};
pub use service::snapshot::{ImportFailure, ImportOutcome, ImportReport, SnapshotError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

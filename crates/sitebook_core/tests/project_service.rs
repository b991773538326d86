use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use sitebook_core::db::open_db_in_memory;
use sitebook_core::{
    ImportFailure, ManagerError, ProjectData, ProjectPatch, ProjectRecord, ProjectService,
    ProjectServiceError, ProjectStatus, RecordStore, SqliteRecordStore, StoreError, StoreResult,
    StoredRecord, TaskData, TaskType, UserRole, ValidationError, PROJECTS_COLLECTION,
};
use std::cell::RefCell;
use std::rc::Rc;

fn project(name: &str) -> ProjectData {
    ProjectData {
        name: name.to_string(),
        description: "office block".to_string(),
        status: ProjectStatus::Pending,
        user_role: UserRole::Architect,
        created_date: Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
        finish_date: Utc.with_ymd_and_hms(2027, 6, 1, 0, 0, 0).unwrap(),
        cost: 1000.0,
        progress: 0.0,
        tasks: Vec::new(),
    }
}

fn survey() -> TaskData {
    TaskData {
        task_type: TaskType::Task,
        name: "Survey".to_string(),
        description: String::new(),
        due_date: Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap(),
        status: ProjectStatus::Active,
    }
}

#[test]
fn create_uses_store_assigned_id_and_persists_body() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ProjectService::new(SqliteRecordStore::new(&conn));

    let created = service.create_project(project("Tower A")).unwrap();

    let records = SqliteRecordStore::new(&conn)
        .list_records(PROJECTS_COLLECTION)
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, created.id());
    assert_eq!(records[0].body["name"], "Tower A");
    assert_eq!(records[0].body["userRole"], "architect");
    assert!(records[0].body.get("id").is_none());
}

#[test]
fn rejected_create_never_reaches_the_store() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ProjectService::new(SqliteRecordStore::new(&conn));
    service.create_project(project("Tower A")).unwrap();

    let err = service.create_project(project("Tower A")).unwrap_err();
    assert!(matches!(
        err,
        ProjectServiceError::Manager(ManagerError::Validation(
            ValidationError::DuplicateName { .. }
        ))
    ));

    let mut negative = project("Bridge North");
    negative.cost = -1.0;
    assert!(service.create_project(negative).is_err());

    let records = SqliteRecordStore::new(&conn)
        .list_records(PROJECTS_COLLECTION)
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(service.manager().len(), 1);
}

#[test]
fn updates_and_tasks_are_written_through() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ProjectService::new(SqliteRecordStore::new(&conn));
    let created = service.create_project(project("Tower A")).unwrap();

    let patch = ProjectPatch {
        progress: Some(0.42),
        ..ProjectPatch::new(created.id())
    };
    service.update_project(&patch).unwrap();
    let task = service.add_task(created.id(), survey()).unwrap();

    let records = SqliteRecordStore::new(&conn)
        .list_records(PROJECTS_COLLECTION)
        .unwrap();
    assert_eq!(records[0].body["progress"], 0.42);
    assert_eq!(records[0].body["toDoList"][0]["id"], task.id());

    service.remove_task(created.id(), task.id()).unwrap();
    let records = SqliteRecordStore::new(&conn)
        .list_records(PROJECTS_COLLECTION)
        .unwrap();
    assert_eq!(records[0].body["toDoList"], json!([]));
}

#[test]
fn load_from_store_mirrors_records_without_duplicating() {
    let conn = open_db_in_memory().unwrap();
    let original_id = {
        let mut writer = ProjectService::new(SqliteRecordStore::new(&conn));
        let created = writer.create_project(project("Tower A")).unwrap();
        writer.add_task(created.id(), survey()).unwrap();
        writer.create_project(project("Bridge North")).unwrap();
        created.id().to_string()
    };

    let mut reader = ProjectService::new(SqliteRecordStore::new(&conn));
    let first = reader.load_from_store().unwrap();
    assert!(first.is_clean());
    assert_eq!(first.created_count(), 2);

    let second = reader.load_from_store().unwrap();
    assert_eq!(second.updated_count(), 2);
    assert_eq!(reader.manager().len(), 2);

    let tower = reader.manager().find_by_id(&original_id).unwrap();
    assert_eq!(tower.name(), "Tower A");
    assert_eq!(tower.tasks().len(), 1);
}

#[test]
fn load_from_store_reports_invalid_records() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    store
        .update_record(PROJECTS_COLLECTION, "short", &json!({"name": "abc"}))
        .unwrap();
    store
        .update_record(
            PROJECTS_COLLECTION,
            "good",
            &serde_json::to_value(project("Tower A")).unwrap(),
        )
        .unwrap();

    let mut service = ProjectService::new(store);
    let report = service.load_from_store().unwrap();
    assert_eq!(report.created_count(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index(), 0);
    assert!(service.manager().find_by_id("good").is_some());
}

#[test]
fn import_json_writes_applied_projects() {
    let conn = open_db_in_memory().unwrap();
    let source = {
        let mut manager = sitebook_core::ProjectsManager::new();
        manager
            .create_project_with_id(project("Tower A"), "p-1")
            .unwrap();
        manager.export_json().unwrap()
    };

    let mut service = ProjectService::new(SqliteRecordStore::new(&conn));
    let report = service.import_json(&source).unwrap();
    assert_eq!(report.created_count(), 1);

    let records = SqliteRecordStore::new(&conn)
        .list_records(PROJECTS_COLLECTION)
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "p-1");
}

struct ReadOnlyStore {
    added: RefCell<u32>,
}

impl RecordStore for ReadOnlyStore {
    fn add_record(&self, _collection: &str, _record: &Value) -> StoreResult<String> {
        let mut added = self.added.borrow_mut();
        *added += 1;
        Ok(format!("doc-{added}"))
    }

    fn update_record(&self, collection: &str, _id: &str, _record: &Value) -> StoreResult<()> {
        Err(StoreError::InvalidCollection(collection.to_string()))
    }

    fn list_records(&self, _collection: &str) -> StoreResult<Vec<StoredRecord>> {
        Ok(Vec::new())
    }
}

#[test]
fn failed_write_is_reported_but_memory_change_is_kept() {
    let mut service = ProjectService::new(ReadOnlyStore {
        added: RefCell::new(0),
    });
    let created = service.create_project(project("Tower A")).unwrap();
    assert_eq!(created.id(), "doc-1");

    let patch = ProjectPatch {
        cost: Some(5.0),
        ..ProjectPatch::new(created.id())
    };
    let err = service.update_project(&patch).unwrap_err();
    assert!(matches!(err, ProjectServiceError::Store(_)));
    assert_eq!(service.manager().find_by_id("doc-1").unwrap().cost(), 5.0);

    assert!(service.delete_project("doc-1"));
    assert!(service.manager().is_empty());
}

struct RejectingStore {
    rejected_id: &'static str,
    written: Rc<RefCell<Vec<String>>>,
}

impl RecordStore for RejectingStore {
    fn add_record(&self, _collection: &str, _record: &Value) -> StoreResult<String> {
        Err(StoreError::BlankId)
    }

    fn update_record(&self, collection: &str, id: &str, _record: &Value) -> StoreResult<()> {
        if id == self.rejected_id {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }
        self.written.borrow_mut().push(id.to_string());
        Ok(())
    }

    fn list_records(&self, _collection: &str) -> StoreResult<Vec<StoredRecord>> {
        Ok(Vec::new())
    }
}

#[test]
fn one_failed_write_does_not_stop_the_import() {
    let written: Rc<RefCell<Vec<String>>> = Rc::default();
    let mut service = ProjectService::new(RejectingStore {
        rejected_id: "p-1",
        written: Rc::clone(&written),
    });
    let records = ["Tower A", "Bridge North", "Harbour Hall"]
        .iter()
        .enumerate()
        .map(|(position, name)| ProjectRecord {
            id: format!("p-{}", position + 1),
            data: project(name),
        })
        .collect();

    let report = service.import_snapshot(records);

    assert_eq!(report.created_count(), 3);
    assert_eq!(service.manager().len(), 3);
    assert_eq!(report.failures.len(), 1);
    match &report.failures[0] {
        ImportFailure::Unsaved { index, id, .. } => {
            assert_eq!(*index, 0);
            assert_eq!(id, "p-1");
        }
        other => panic!("unexpected failure: {other}"),
    }
    assert_eq!(*written.borrow(), vec!["p-2".to_string(), "p-3".to_string()]);
}

#[test]
fn task_edits_and_created_date_are_written_through() {
    let conn = open_db_in_memory().unwrap();
    let mut service = ProjectService::new(SqliteRecordStore::new(&conn));
    let created = service.create_project(project("Tower A")).unwrap();
    let task = service.add_task(created.id(), survey()).unwrap();

    let mut finished = task.to_data();
    finished.status = ProjectStatus::Finished;
    service.update_task(created.id(), task.id(), finished).unwrap();
    let patch = ProjectPatch {
        created_date: Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()),
        ..ProjectPatch::new(created.id())
    };
    service.update_project(&patch).unwrap();

    let records = SqliteRecordStore::new(&conn)
        .list_records(PROJECTS_COLLECTION)
        .unwrap();
    assert_eq!(records[0].body["toDoList"][0]["status"], "finished");
    assert_eq!(records[0].body["createdDate"], "2026-05-01T00:00:00Z");
}

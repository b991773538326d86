use chrono::{TimeZone, Utc};
use sitebook_core::{
    Project, ProjectData, ProjectPatch, ProjectRecord, ProjectStatus, Task, TaskData, TaskType,
    UserRole, ValidationError,
};

fn tower_a() -> ProjectData {
    ProjectData {
        name: "Tower A".to_string(),
        description: "office block".to_string(),
        status: ProjectStatus::Pending,
        user_role: UserRole::Architect,
        created_date: Utc.with_ymd_and_hms(2026, 2, 1, 8, 30, 0).unwrap(),
        finish_date: Utc.with_ymd_and_hms(2027, 2, 1, 17, 0, 0).unwrap(),
        cost: 1000.0,
        progress: 0.0,
        tasks: Vec::new(),
    }
}

fn survey() -> TaskData {
    TaskData {
        task_type: TaskType::Task,
        name: "Survey".to_string(),
        description: "measure the plot".to_string(),
        due_date: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        status: ProjectStatus::Pending,
    }
}

#[test]
fn new_project_gets_generated_id_and_empty_tasks() {
    let project = Project::new(tower_a()).unwrap();

    assert!(!project.id().is_empty());
    assert_eq!(project.name(), "Tower A");
    assert_eq!(project.description(), "office block");
    assert_eq!(project.cost(), 1000.0);
    assert!(project.tasks().is_empty());
}

#[test]
fn with_id_rejects_blank_id() {
    let err = Project::with_id("  ", tower_a()).unwrap_err();
    assert_eq!(err, ValidationError::BlankId);
}

#[test]
fn construction_enforces_numeric_ranges() {
    let mut negative = tower_a();
    negative.cost = -1.0;
    assert_eq!(
        Project::new(negative).unwrap_err(),
        ValidationError::InvalidCost(-1.0)
    );

    let mut overdone = tower_a();
    overdone.progress = 1.5;
    assert_eq!(
        Project::new(overdone).unwrap_err(),
        ValidationError::InvalidProgress(1.5)
    );
}

#[test]
fn construction_rejects_duplicate_task_ids() {
    let mut data = tower_a();
    data.tasks = vec![Task::with_id("t-1", survey()), Task::with_id("t-1", survey())];

    let err = Project::new(data).unwrap_err();
    assert_eq!(err, ValidationError::DuplicateTaskId("t-1".to_string()));
}

#[test]
fn add_task_appends_with_fresh_id() {
    let mut project = Project::new(tower_a()).unwrap();

    let first_id = project.add_task(survey()).id().to_string();
    let second_id = project.add_task(survey()).id().to_string();

    assert_eq!(project.tasks().len(), 2);
    assert_ne!(first_id, second_id);
    assert_eq!(project.tasks()[0].id(), first_id);
    assert_eq!(project.find_task(&second_id).unwrap().name, "Survey");
}

#[test]
fn update_and_remove_task_by_id() {
    let mut project = Project::new(tower_a()).unwrap();
    let task_id = project.add_task(survey()).id().to_string();
    project.add_task(survey());

    let mut done = survey();
    done.status = ProjectStatus::Finished;
    let updated = project.update_task(&task_id, done).unwrap();
    assert_eq!(updated.status, ProjectStatus::Finished);
    assert!(project.update_task("missing", survey()).is_none());

    let removed = project.remove_task(&task_id).unwrap();
    assert_eq!(removed.id(), task_id);
    assert_eq!(project.tasks().len(), 1);
    assert!(project.remove_task(&task_id).is_none());
}

#[test]
fn update_merges_only_present_fields_and_keeps_tasks() {
    let mut project = Project::new(tower_a()).unwrap();
    project.add_task(survey());
    let id = project.id().to_string();

    let patch = ProjectPatch {
        name: Some("Tower A2".to_string()),
        status: Some(ProjectStatus::Active),
        progress: Some(0.25),
        ..ProjectPatch::new("ignored")
    };
    project.update(&patch).unwrap();

    assert_eq!(project.id(), id);
    assert_eq!(project.name(), "Tower A2");
    assert_eq!(project.initials(), "TA");
    assert_eq!(project.status(), ProjectStatus::Active);
    assert_eq!(project.progress(), 0.25);
    assert_eq!(project.description(), "office block");
    assert_eq!(project.user_role(), UserRole::Architect);
    assert_eq!(project.tasks().len(), 1);
}

#[test]
fn failed_update_leaves_project_unchanged() {
    let mut project = Project::new(tower_a()).unwrap();
    let before = project.clone();

    let patch = ProjectPatch {
        description: Some("changed".to_string()),
        cost: Some(f64::NAN),
        ..ProjectPatch::new(project.id())
    };
    let err = project.update(&patch).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidCost(_)));
    assert_eq!(project, before);

    let patch = ProjectPatch {
        name: Some("#bad name".to_string()),
        ..ProjectPatch::new(project.id())
    };
    assert!(matches!(
        project.update(&patch),
        Err(ValidationError::NameInvalidFirstCharacter { .. })
    ));
    assert_eq!(project, before);
}

#[test]
fn record_serialization_uses_expected_wire_fields() {
    let mut project = Project::with_id("p-42", tower_a()).unwrap();
    let task_id = project.add_task(survey()).id().to_string();

    let json = serde_json::to_value(project.to_record()).unwrap();
    assert_eq!(json["id"], "p-42");
    assert_eq!(json["name"], "Tower A");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["userRole"], "architect");
    assert_eq!(json["createdDate"], "2026-02-01T08:30:00Z");
    assert_eq!(json["finishDate"], "2027-02-01T17:00:00Z");
    assert_eq!(json["cost"], 1000.0);
    assert_eq!(json["progress"], 0.0);
    assert_eq!(json["toDoList"][0]["id"], task_id);
    assert_eq!(json["toDoList"][0]["taskType"], "task");
    assert_eq!(json["toDoList"][0]["dueDate"], "2026-03-01T09:00:00Z");

    let decoded: ProjectRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, project.to_record());
}

#[test]
fn record_deserialization_accepts_form_spellings_and_missing_optionals() {
    let value = serde_json::json!({
        "name": "Bridge North",
        "status": "Active",
        "userRole": "Engineer",
        "createdDate": "2026-01-01T00:00:00Z",
        "finishDate": "2026-12-31T00:00:00+02:00",
        "cost": 1200,
        "progress": 0.5
    });

    let record: ProjectRecord = serde_json::from_value(value).unwrap();
    assert_eq!(record.id, "");
    assert_eq!(record.data.description, "");
    assert_eq!(record.data.status, ProjectStatus::Active);
    assert_eq!(record.data.user_role, UserRole::Engineer);
    assert_eq!(
        record.data.finish_date,
        Utc.with_ymd_and_hms(2026, 12, 30, 22, 0, 0).unwrap()
    );
    assert_eq!(record.data.cost, 1200.0);
    assert!(record.data.tasks.is_empty());
}

//! Command-line front end for sitebook.
//!
//! # Responsibility
//! - Parse raw text input (currency, percentage, dates) before calling core.
//! - Mirror the record store into memory on start, then run one command.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use log::warn;
use sitebook_core::db::open_db;
use sitebook_core::{
    init_logging, parse_currency, parse_percentage, CoreConfig, ImportReport, ManagerError,
    Project, ProjectData, ProjectPatch, ProjectService, ProjectStatus, SqliteRecordStore,
    TaskData, TaskType, UserRole,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "sitebook", version, about = "Track projects and their to-dos")]
struct Cli {
    /// Database file; overrides SITEBOOK_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the core version.
    Version,
    /// Create a project.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "pending")]
        status: ProjectStatus,
        #[arg(long, default_value = "architect")]
        role: UserRole,
        /// Finish date (YYYY-MM-DD). Defaults to one year from today.
        #[arg(long, value_parser = parse_date)]
        finish: Option<DateTime<Utc>>,
        /// Cost such as "$ 1,200.50".
        #[arg(long, default_value = "0", value_parser = parse_currency)]
        cost: f64,
        /// Progress such as "42%".
        #[arg(long, default_value = "0%", value_parser = parse_percentage)]
        progress: f64,
    },
    /// Update fields of an existing project.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long)]
        role: Option<UserRole>,
        #[arg(long, value_parser = parse_date)]
        created: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_date)]
        finish: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_currency)]
        cost: Option<f64>,
        #[arg(long, value_parser = parse_percentage)]
        progress: Option<f64>,
    },
    /// List projects, optionally filtered by name/description.
    List {
        #[arg(long)]
        query: Option<String>,
    },
    /// Add a to-do to a project.
    AddTask {
        #[arg(long)]
        project: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "task")]
        task_type: TaskType,
        #[arg(long, default_value = "pending")]
        status: ProjectStatus,
        /// Due date (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,
    },
    /// Change fields of an existing to-do.
    UpdateTask {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        task_type: Option<TaskType>,
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,
    },
    /// Remove a to-do from a project.
    RemoveTask {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: String,
    },
    /// Write all projects as JSON to a file or stdout.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import projects from a JSON export.
    Import { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Version = cli.command {
        println!("sitebook_core version={}", sitebook_core::core_version());
        return Ok(());
    }

    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Err(err) = init_logging(&config.logging()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)?;
    let mut service = ProjectService::new(SqliteRecordStore::new(&conn));
    let loaded = service.load_from_store()?;
    report_failures("load", &loaded);

    match cli.command {
        Command::Version => {}
        Command::Create {
            name,
            description,
            status,
            role,
            finish,
            cost,
            progress,
        } => {
            let now = Utc::now();
            let data = ProjectData {
                name,
                description,
                status,
                user_role: role,
                created_date: now,
                finish_date: finish
                    .unwrap_or_else(|| now.checked_add_months(Months::new(12)).unwrap_or(now)),
                cost,
                progress,
                tasks: Vec::new(),
            };
            let project = service.create_project(data)?;
            println!("{}", project.id());
        }
        Command::Update {
            id,
            name,
            description,
            status,
            role,
            created,
            finish,
            cost,
            progress,
        } => {
            let patch = ProjectPatch {
                name,
                description,
                status,
                user_role: role,
                created_date: created,
                finish_date: finish,
                cost,
                progress,
                ..ProjectPatch::new(id)
            };
            service.update_project(&patch)?;
        }
        Command::List { query } => {
            let projects = service.manager().filter(query.as_deref().unwrap_or(""));
            for project in &projects {
                println!("{}", format_row(project));
            }
        }
        Command::AddTask {
            project,
            name,
            description,
            task_type,
            status,
            due,
        } => {
            let data = TaskData {
                task_type,
                name,
                description,
                due_date: due.unwrap_or_else(Utc::now),
                status,
            };
            let task = service.add_task(&project, data)?;
            println!("{}", task.id());
        }
        Command::UpdateTask {
            project,
            task,
            name,
            description,
            task_type,
            status,
            due,
        } => {
            let current = service
                .manager()
                .find_by_id(&project)
                .ok_or_else(|| ManagerError::ProjectNotFound(project.clone()))?
                .find_task(&task)
                .ok_or_else(|| ManagerError::TaskNotFound {
                    project_id: project.clone(),
                    task_id: task.clone(),
                })?
                .to_data();
            let data = TaskData {
                task_type: task_type.unwrap_or(current.task_type),
                name: name.unwrap_or(current.name),
                description: description.unwrap_or(current.description),
                due_date: due.unwrap_or(current.due_date),
                status: status.unwrap_or(current.status),
            };
            service.update_task(&project, &task, data)?;
        }
        Command::RemoveTask { project, task } => {
            let removed = service.remove_task(&project, &task)?;
            println!("{}", removed.id());
        }
        Command::Export { out } => {
            let payload = service.manager().export_json()?;
            match out {
                Some(path) => std::fs::write(path, payload)?,
                None => println!("{payload}"),
            }
        }
        Command::Import { file } => {
            let payload = std::fs::read_to_string(file)?;
            let report = service.import_json(&payload)?;
            println!(
                "created={} updated={} failed={}",
                report.created_count(),
                report.updated_count(),
                report.failures.len()
            );
            report_failures("import", &report);
        }
    }
    Ok(())
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
}

fn format_row(project: &Project) -> String {
    format!(
        "{}\t[{}]\t{}\t{}\t{}\t$ {}\t{}%\t{} task(s)",
        project.id(),
        project.initials(),
        project.name(),
        project.status(),
        project.user_role(),
        project.cost(),
        (project.progress() * 100.0).round(),
        project.tasks().len()
    )
}

fn report_failures(stage: &str, report: &ImportReport) {
    for failure in &report.failures {
        warn!(
            "event=cli_{stage} module=cli status=skipped index={}",
            failure.index()
        );
        eprintln!("skipped: {failure}");
    }
}

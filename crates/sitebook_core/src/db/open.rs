//! Connection bootstrap for the record store.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - File databases get their parent directory created on demand.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Where a record store database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    Memory,
    File(PathBuf),
}

impl DbLocation {
    fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

/// Opens a database file (creating parent directories) and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open(&DbLocation::File(path.as_ref().to_path_buf()))
}

/// Opens a private in-memory database and migrates it.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open(&DbLocation::Memory)
}

/// Opens a connection at `location` and applies pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open(location: &DbLocation) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = location.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect(location).and_then(|mut conn| {
        bootstrap_connection(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn connect(location: &DbLocation) -> DbResult<Connection> {
    match location {
        DbLocation::Memory => Ok(Connection::open_in_memory()?),
        DbLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            Ok(Connection::open(path)?)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)
}

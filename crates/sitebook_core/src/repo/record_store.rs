//! Document-style record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the persistence collaborator the project service writes through.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Collection paths are normalized (`"/projects"` == `"projects"`).
//! - `list_records` returns records in first-insertion order.
//! - `update_record` writes the record under `id`, inserting when absent.
//! - Read paths reject undecodable bodies instead of masking them.

use crate::db::DbError;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Collection holding project records.
pub const PROJECTS_COLLECTION: &str = "/projects";

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Collection path is empty after normalization.
    InvalidCollection(String),
    /// Record id is empty after trim.
    BlankId,
    /// Persisted body is not valid JSON.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidCollection(path) => write!(f, "invalid collection path: `{path}`"),
            Self::BlankId => write!(f, "record id must not be blank"),
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One record as returned by [`RecordStore::list_records`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub body: Value,
}

/// Persistence collaborator: three operations, no query language.
pub trait RecordStore {
    /// Inserts a record under a store-assigned id and returns that id.
    fn add_record(&self, collection: &str, record: &Value) -> StoreResult<String>;
    /// Writes a record under `id`, replacing any previous body.
    fn update_record(&self, collection: &str, id: &str, record: &Value) -> StoreResult<()>;
    /// Lists every record of a collection in insertion order.
    fn list_records(&self, collection: &str) -> StoreResult<Vec<StoredRecord>>;
}

/// SQLite-backed record store over the `records` table.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn add_record(&self, collection: &str, record: &Value) -> StoreResult<String> {
        let collection = normalize_collection(collection)?;
        let id = Uuid::new_v4().simple().to_string();

        self.conn.execute(
            "INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3);",
            params![collection, id, record.to_string()],
        )?;
        Ok(id)
    }

    fn update_record(&self, collection: &str, id: &str, record: &Value) -> StoreResult<()> {
        let collection = normalize_collection(collection)?;
        let id = id.trim();
        if id.is_empty() {
            return Err(StoreError::BlankId);
        }

        self.conn.execute(
            "INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, id) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![collection, id, record.to_string()],
        )?;
        Ok(())
    }

    fn list_records(&self, collection: &str) -> StoreResult<Vec<StoredRecord>> {
        let collection = normalize_collection(collection)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, body FROM records
             WHERE collection = ?1
             ORDER BY rowid ASC;",
        )?;

        let mut rows = stmt.query([collection])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("id")?;
            let body_text: String = row.get("body")?;
            let body = serde_json::from_str(&body_text).map_err(|err| {
                StoreError::InvalidData(format!("records.body for `{id}` is not JSON: {err}"))
            })?;
            records.push(StoredRecord { id, body });
        }
        Ok(records)
    }
}

fn normalize_collection(path: &str) -> StoreResult<&str> {
    let normalized = path.trim().trim_matches('/');
    if normalized.is_empty() {
        return Err(StoreError::InvalidCollection(path.to_string()));
    }
    Ok(normalized)
}

//! Persistence contracts and their SQLite implementations.
//!
//! One trait per table family (subjects, attendance, grades); services and
//! views only see the traits.
//!
//! # Invariants
//! - Writes validate records before they reach SQL.
//! - Rows that fail to parse surface as `InvalidData`, never as defaults.
//! - Missing rows on delete/upsert surface as `NotFound`, not as silent
//!   no-ops (attendance deletes excepted: clearing a day is idempotent).
//! - Every call is scoped to an owner. A subject owned by someone else is
//!   reported as `NotFound`, same as a missing one.

pub mod attendance_repo;
pub mod grade_repo;
pub mod subject_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::date::parse_date;
use crate::model::subject::SubjectId;
use crate::model::user::UserId;
use crate::model::ValidationError;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all table families.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: Uuid },
    InvalidData(String),
    /// Connection was handed over before migrations completed.
    SchemaNotReady { found: u32, expected: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "database schema version {found} does not match expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that did not go through `db::open_db*`.
pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let found = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let expected = latest_version();
    if found != expected {
        return Err(RepoError::SchemaNotReady { found, expected });
    }
    Ok(())
}

/// Fails with `NotFound` unless `subject_id` exists and belongs to `owner`.
pub(crate) fn ensure_subject_owned(
    conn: &Connection,
    owner: UserId,
    subject_id: SubjectId,
) -> RepoResult<()> {
    let owned = conn
        .query_row(
            "SELECT 1 FROM subjects WHERE id = ?1 AND user_id = ?2;",
            params![subject_id.to_string(), owner.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();
    if !owned {
        return Err(RepoError::NotFound {
            entity: "subject",
            id: subject_id,
        });
    }
    Ok(())
}

pub(crate) fn parse_uuid_column(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_date_column(value: &str, column: &str) -> RepoResult<NaiveDate> {
    parse_date(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid date value `{value}` in {column}")))
}

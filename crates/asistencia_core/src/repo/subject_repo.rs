//! Subject repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD over `subjects`.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Every read and delete is scoped to the owning user.
//! - List order is creation order (`created_at ASC, rowid ASC`).
//! - Deleting a subject cascades to its attendance and grade rows.

use super::{ensure_schema_ready, parse_uuid_column, RepoError, RepoResult};
use crate::model::subject::{Subject, SubjectId};
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};

const SUBJECT_SELECT_SQL: &str = "SELECT id, user_id, name FROM subjects";

/// Repository interface for subject CRUD operations.
pub trait SubjectRepository {
    /// Inserts one subject and returns the stored row.
    fn create_subject(&self, subject: &Subject) -> RepoResult<Subject>;
    fn get_subject(&self, owner: UserId, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn list_subjects(&self, owner: UserId) -> RepoResult<Vec<Subject>>;
    /// Deletes one subject and everything recorded for it.
    ///
    /// Returns `NotFound` when the subject does not exist for `owner`.
    fn delete_subject(&self, owner: UserId, id: SubjectId) -> RepoResult<()>;
}

impl<T: SubjectRepository + ?Sized> SubjectRepository for &T {
    fn create_subject(&self, subject: &Subject) -> RepoResult<Subject> {
        (**self).create_subject(subject)
    }

    fn get_subject(&self, owner: UserId, id: SubjectId) -> RepoResult<Option<Subject>> {
        (**self).get_subject(owner, id)
    }

    fn list_subjects(&self, owner: UserId) -> RepoResult<Vec<Subject>> {
        (**self).list_subjects(owner)
    }

    fn delete_subject(&self, owner: UserId, id: SubjectId) -> RepoResult<()> {
        (**self).delete_subject(owner, id)
    }
}

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SubjectRepository for SqliteSubjectRepository<'_> {
    fn create_subject(&self, subject: &Subject) -> RepoResult<Subject> {
        subject.validate()?;

        self.conn.execute(
            "INSERT INTO subjects (id, user_id, name) VALUES (?1, ?2, ?3);",
            params![
                subject.id.to_string(),
                subject.user_id.to_string(),
                subject.name.trim(),
            ],
        )?;

        self.get_subject(subject.user_id, subject.id)?.ok_or_else(|| {
            RepoError::InvalidData("created subject missing in read-back".to_string())
        })
    }

    fn get_subject(&self, owner: UserId, id: SubjectId) -> RepoResult<Option<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBJECT_SELECT_SQL}
             WHERE id = ?1
               AND user_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subject_row(row)?));
        }

        Ok(None)
    }

    fn list_subjects(&self, owner: UserId) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBJECT_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;

        let mut rows = stmt.query([owner.to_string()])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }

        Ok(subjects)
    }

    fn delete_subject(&self, owner: UserId, id: SubjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM subjects WHERE id = ?1 AND user_id = ?2;",
            params![id.to_string(), owner.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "subject",
                id,
            });
        }

        Ok(())
    }
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let subject = Subject {
        id: parse_uuid_column(&id_text, "subjects.id")?,
        user_id: parse_uuid_column(&user_text, "subjects.user_id")?,
        name: row.get("name")?,
    };
    subject.validate()?;
    Ok(subject)
}

//! Grade entry repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Entries are validated on write and on read-back.
//! - Only the subject owner can list, add or remove its entries.
//! - List order is creation order.

use super::{ensure_schema_ready, ensure_subject_owned, parse_uuid_column, RepoError, RepoResult};
use crate::model::grade::{GradeEntry, GradeId};
use crate::model::subject::SubjectId;
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};

/// Repository interface for grade entries.
pub trait GradeRepository {
    /// `grade.user_id` must own `grade.subject_id`.
    fn create_grade(&self, grade: &GradeEntry) -> RepoResult<GradeId>;
    fn list_grades(&self, owner: UserId, subject_id: SubjectId) -> RepoResult<Vec<GradeEntry>>;
    /// Returns `NotFound` when no entry `id` exists under `subject_id`.
    fn delete_grade(&self, owner: UserId, subject_id: SubjectId, id: GradeId) -> RepoResult<()>;
}

impl<T: GradeRepository + ?Sized> GradeRepository for &T {
    fn create_grade(&self, grade: &GradeEntry) -> RepoResult<GradeId> {
        (**self).create_grade(grade)
    }

    fn list_grades(&self, owner: UserId, subject_id: SubjectId) -> RepoResult<Vec<GradeEntry>> {
        (**self).list_grades(owner, subject_id)
    }

    fn delete_grade(&self, owner: UserId, subject_id: SubjectId, id: GradeId) -> RepoResult<()> {
        (**self).delete_grade(owner, subject_id, id)
    }
}

/// SQLite-backed grade repository.
pub struct SqliteGradeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGradeRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl GradeRepository for SqliteGradeRepository<'_> {
    fn create_grade(&self, grade: &GradeEntry) -> RepoResult<GradeId> {
        grade.validate()?;
        ensure_subject_owned(self.conn, grade.user_id, grade.subject_id)?;

        self.conn.execute(
            "INSERT INTO grade_entries (id, subject_id, user_id, label, score, weight)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                grade.id.to_string(),
                grade.subject_id.to_string(),
                grade.user_id.to_string(),
                grade.label.trim(),
                grade.score,
                grade.weight,
            ],
        )?;

        Ok(grade.id)
    }

    fn list_grades(&self, owner: UserId, subject_id: SubjectId) -> RepoResult<Vec<GradeEntry>> {
        ensure_subject_owned(self.conn, owner, subject_id)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, user_id, label, score, weight
             FROM grade_entries
             WHERE subject_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;

        let mut rows = stmt.query([subject_id.to_string()])?;
        let mut grades = Vec::new();
        while let Some(row) = rows.next()? {
            grades.push(parse_grade_row(row)?);
        }

        Ok(grades)
    }

    fn delete_grade(&self, owner: UserId, subject_id: SubjectId, id: GradeId) -> RepoResult<()> {
        ensure_subject_owned(self.conn, owner, subject_id)?;

        let changed = self.conn.execute(
            "DELETE FROM grade_entries WHERE id = ?1 AND subject_id = ?2;",
            params![id.to_string(), subject_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "grade", id });
        }

        Ok(())
    }
}

fn parse_grade_row(row: &Row<'_>) -> RepoResult<GradeEntry> {
    let id_text: String = row.get("id")?;
    let subject_text: String = row.get("subject_id")?;
    let user_text: String = row.get("user_id")?;
    let grade = GradeEntry {
        id: parse_uuid_column(&id_text, "grade_entries.id")?,
        subject_id: parse_uuid_column(&subject_text, "grade_entries.subject_id")?,
        user_id: parse_uuid_column(&user_text, "grade_entries.user_id")?,
        label: row.get("label")?,
        score: row.get("score")?,
        weight: row.get("weight")?,
    };
    grade.validate()?;
    Ok(grade)
}

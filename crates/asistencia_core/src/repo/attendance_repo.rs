//! Attendance repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read month windows and all-time statuses for one subject.
//! - Upsert/delete single-day records keyed by `(subject_id, date)`.
//!
//! # Invariants
//! - Upsert never creates a second row for the same `(subject_id, date)`.
//! - A record keeps the `user_id` it was created with; only the subject owner
//!   can write it.
//! - Deleting an unmarked day is a no-op, not an error.
//! - Range reads are inclusive on both ends and ordered by date.

use super::{ensure_schema_ready, ensure_subject_owned, parse_date_column, RepoError, RepoResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, DayMark};
use crate::model::date::format_date;
use crate::model::subject::SubjectId;
use crate::model::user::UserId;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

/// Repository interface for attendance records.
///
/// Every method fails with `NotFound { entity: "subject" }` when the subject
/// does not belong to the given owner.
pub trait AttendanceRepository {
    /// Lists marks for `subject_id` with `start <= date <= end`.
    fn list_range(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DayMark>>;
    /// Lists every stored status for `subject_id`.
    fn list_statuses(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> RepoResult<Vec<AttendanceStatus>>;
    /// Inserts or replaces the record for `(record.subject_id, record.date)`.
    /// `record.user_id` must own the subject.
    fn upsert_record(&self, record: &AttendanceRecord) -> RepoResult<()>;
    /// Removes the record for `(subject_id, date)` if present.
    fn delete_record(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        date: NaiveDate,
    ) -> RepoResult<()>;
}

impl<T: AttendanceRepository + ?Sized> AttendanceRepository for &T {
    fn list_range(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DayMark>> {
        (**self).list_range(owner, subject_id, start, end)
    }

    fn list_statuses(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> RepoResult<Vec<AttendanceStatus>> {
        (**self).list_statuses(owner, subject_id)
    }

    fn upsert_record(&self, record: &AttendanceRecord) -> RepoResult<()> {
        (**self).upsert_record(record)
    }

    fn delete_record(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        date: NaiveDate,
    ) -> RepoResult<()> {
        (**self).delete_record(owner, subject_id, date)
    }
}

/// SQLite-backed attendance repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn list_range(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DayMark>> {
        ensure_subject_owned(self.conn, owner, subject_id)?;

        let mut stmt = self.conn.prepare(
            "SELECT date, status
             FROM attendance_records
             WHERE subject_id = ?1
               AND date >= ?2
               AND date <= ?3
             ORDER BY date ASC;",
        )?;

        let mut rows = stmt.query(params![
            subject_id.to_string(),
            format_date(start),
            format_date(end),
        ])?;
        let mut marks = Vec::new();
        while let Some(row) = rows.next()? {
            marks.push(parse_mark_row(row)?);
        }

        Ok(marks)
    }

    fn list_statuses(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> RepoResult<Vec<AttendanceStatus>> {
        ensure_subject_owned(self.conn, owner, subject_id)?;

        let mut stmt = self
            .conn
            .prepare("SELECT status FROM attendance_records WHERE subject_id = ?1;")?;

        let mut rows = stmt.query([subject_id.to_string()])?;
        let mut statuses = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get("status")?;
            statuses.push(parse_status(&value)?);
        }

        Ok(statuses)
    }

    fn upsert_record(&self, record: &AttendanceRecord) -> RepoResult<()> {
        ensure_subject_owned(self.conn, record.user_id, record.subject_id)?;

        self.conn.execute(
            "INSERT INTO attendance_records (subject_id, user_id, date, status)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(subject_id, date) DO UPDATE SET
                status = excluded.status,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                record.subject_id.to_string(),
                record.user_id.to_string(),
                format_date(record.date),
                record.status.as_str(),
            ],
        )?;

        Ok(())
    }

    fn delete_record(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        date: NaiveDate,
    ) -> RepoResult<()> {
        ensure_subject_owned(self.conn, owner, subject_id)?;

        self.conn.execute(
            "DELETE FROM attendance_records WHERE subject_id = ?1 AND date = ?2;",
            params![subject_id.to_string(), format_date(date)],
        )?;
        Ok(())
    }
}

fn parse_mark_row(row: &Row<'_>) -> RepoResult<DayMark> {
    let date_text: String = row.get("date")?;
    let status_text: String = row.get("status")?;
    Ok(DayMark {
        date: parse_date_column(&date_text, "attendance_records.date")?,
        status: parse_status(&status_text)?,
    })
}

fn parse_status(value: &str) -> RepoResult<AttendanceStatus> {
    AttendanceStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{value}` in attendance_records.status"
        ))
    })
}

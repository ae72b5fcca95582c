//! Attendance use-case service.
//!
//! # Responsibility
//! - Read the marks of one calendar month and the all-time summary.
//! - Apply one day's new status (`Some` upserts, `None` clears).
//!
//! # Invariants
//! - Month reads always cover the whole month containing the given day.
//! - Reads and writes are scoped to the acting user; the store rejects
//!   subjects owned by someone else.

use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary, DayMark};
use crate::model::date::month_bounds;
use crate::model::subject::SubjectId;
use crate::model::user::UserId;
use crate::repo::attendance_repo::AttendanceRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AttendanceServiceError {
    SubjectNotFound(SubjectId),
    Repo(RepoError),
}

impl Display for AttendanceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::SubjectNotFound(_) => None,
        }
    }
}

impl From<RepoError> for AttendanceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "subject",
                id,
            } => Self::SubjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Attendance use-case service.
pub struct AttendanceService<R: AttendanceRepository> {
    repo: R,
}

impl<R: AttendanceRepository> AttendanceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the marks of the month that contains `any_day`.
    pub fn month_records(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        any_day: NaiveDate,
    ) -> Result<Vec<DayMark>, AttendanceServiceError> {
        let (start, end) = month_bounds(any_day);
        let marks = self.repo.list_range(owner, subject_id, start, end)?;
        debug!(
            "event=attendance_month module=service status=ok subject_id={} month_start={} marks={}",
            subject_id,
            start,
            marks.len()
        );
        Ok(marks)
    }

    pub fn total_summary(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<AttendanceSummary, AttendanceServiceError> {
        let statuses = self.repo.list_statuses(owner, subject_id)?;
        Ok(AttendanceSummary::from_statuses(statuses))
    }

    /// Stores `status` for one day, or clears the day when `status` is `None`.
    pub fn apply(
        &self,
        subject_id: SubjectId,
        user_id: UserId,
        date: NaiveDate,
        status: Option<AttendanceStatus>,
    ) -> Result<(), AttendanceServiceError> {
        match status {
            Some(status) => self.repo.upsert_record(&AttendanceRecord {
                subject_id,
                user_id,
                date,
                status,
            })?,
            None => self.repo.delete_record(user_id, subject_id, date)?,
        }
        debug!(
            "event=attendance_apply module=service status=ok subject_id={} date={} value={}",
            subject_id,
            date,
            status.map_or("unmarked", AttendanceStatus::as_str)
        );
        Ok(())
    }
}

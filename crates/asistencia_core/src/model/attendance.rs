//! Attendance records and the day-status cycle.
//!
//! # Invariants
//! - At most one record exists per `(subject_id, date)`.
//! - Only `presente` and `ausente` are stored; unmarked means no record.
//! - Clicking a day cycles `unmarked -> presente -> ausente -> unmarked`.

use super::subject::SubjectId;
use super::user::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored attendance status for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Presente,
    Ausente,
}

impl AttendanceStatus {
    /// Wire/storage string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Presente => "presente",
            Self::Ausente => "ausente",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "presente" => Some(Self::Presente),
            "ausente" => Some(Self::Ausente),
            _ => None,
        }
    }
}

/// Returns the status a day moves to when clicked.
pub fn next_status(current: Option<AttendanceStatus>) -> Option<AttendanceStatus> {
    match current {
        None => Some(AttendanceStatus::Presente),
        Some(AttendanceStatus::Presente) => Some(AttendanceStatus::Ausente),
        Some(AttendanceStatus::Ausente) => None,
    }
}

/// Persisted attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub subject_id: SubjectId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Calendar projection of one marked day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMark {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// All-time counts of marked days for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub presente: u32,
    pub ausente: u32,
}

impl AttendanceSummary {
    pub fn from_statuses(statuses: impl IntoIterator<Item = AttendanceStatus>) -> Self {
        statuses
            .into_iter()
            .fold(Self::default(), |mut acc, status| {
                match status {
                    AttendanceStatus::Presente => acc.presente += 1,
                    AttendanceStatus::Ausente => acc.ausente += 1,
                }
                acc
            })
    }

    pub fn total_marked(&self) -> u32 {
        self.presente + self.ausente
    }

    /// Share of marked days that were `presente`, in percent.
    ///
    /// Returns `0.0` when no day is marked.
    pub fn percentage(&self) -> f64 {
        let total = self.total_marked();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.presente) / f64::from(total) * 100.0
    }
}

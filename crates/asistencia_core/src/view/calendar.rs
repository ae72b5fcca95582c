//! Attendance calendar state with optimistic day toggles.
//!
//! # Responsibility
//! - Mirror the marks of the visible month and the all-time summary.
//! - Cycle a clicked day `unmarked -> presente -> ausente -> unmarked`,
//!   showing the new status before the store confirms it.
//!
//! # Invariants
//! - `marks` holds at most one entry per date, ordered by date.
//! - A toggle that fails to save restores `marks` to the exact state that
//!   preceded it and posts `MSG_SAVE_FAILED`.
//! - The summary is refreshed from the store after every confirmed save and
//!   never adjusted locally.
//! - Reads run as the user signed in at `open`; saves run as the user signed
//!   in at `settle`. Either way the store only serves the subject owner.
//!
//! A front end that renders between the optimistic update and the store
//! answer calls `begin_toggle` and later `settle`; `click_day` runs both.

use super::notice::{Notice, NoticeQueue};
use crate::auth::{AuthError, AuthProvider};
use crate::model::attendance::{next_status, AttendanceStatus, AttendanceSummary, DayMark};
use crate::model::date::{month_bounds, month_key};
use crate::model::subject::SubjectId;
use crate::model::user::{User, UserId};
use crate::repo::attendance_repo::AttendanceRepository;
use crate::service::attendance_service::{AttendanceService, AttendanceServiceError};
use chrono::NaiveDate;
use log::{error, info, warn};
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub const MSG_MONTH_LOAD_FAILED: &str = "Error al cargar asistencia del mes";
pub const MSG_SUMMARY_LOAD_FAILED: &str = "Error al cargar resumen total";
pub const MSG_SAVE_FAILED: &str = "No se pudo guardar el cambio.";

/// Optimistic change waiting for the store answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub date: NaiveDate,
    /// Status shown optimistically; `None` clears the day.
    pub next: Option<AttendanceStatus>,
    previous_marks: Vec<DayMark>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Saved(Option<AttendanceStatus>),
    RolledBack,
}

/// Serializable copy of what the calendar renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarSnapshot {
    pub subject_id: SubjectId,
    pub month: String,
    pub marks: Vec<DayMark>,
    pub summary: AttendanceSummary,
    pub percentage: f64,
}

#[derive(Debug)]
enum CalendarError {
    NotSignedIn,
    Auth(AuthError),
    Store(AttendanceServiceError),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "no signed-in user"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

/// Calendar of one subject.
#[derive(Debug)]
pub struct AttendanceCalendar {
    subject_id: SubjectId,
    /// Signed-in user at `open`; `None` leaves the calendar empty.
    viewer: Option<UserId>,
    month_start: NaiveDate,
    marks: Vec<DayMark>,
    summary: AttendanceSummary,
    notices: NoticeQueue,
}

impl AttendanceCalendar {
    /// Creates a calendar showing the month of `today` and loads it for the
    /// signed-in user.
    pub fn open<R: AttendanceRepository, A: AuthProvider>(
        repo: &R,
        auth: &A,
        subject_id: SubjectId,
        today: NaiveDate,
    ) -> Self {
        let viewer = match signed_in_user(auth) {
            Ok(user) => Some(user.id),
            Err(err) => {
                warn!(
                    "event=attendance_open module=view status=error subject_id={subject_id} error={err}"
                );
                None
            }
        };
        let mut calendar = Self {
            subject_id,
            viewer,
            month_start: month_bounds(today).0,
            marks: Vec::new(),
            summary: AttendanceSummary::default(),
            notices: NoticeQueue::default(),
        };
        calendar.reload(repo);
        calendar
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    /// First day of the visible month.
    pub fn month_start(&self) -> NaiveDate {
        self.month_start
    }

    pub fn marks(&self) -> &[DayMark] {
        &self.marks
    }

    pub fn summary(&self) -> AttendanceSummary {
        self.summary
    }

    pub fn percentage(&self) -> f64 {
        self.summary.percentage()
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Status rendered on the tile of `date`.
    pub fn tile_status(&self, date: NaiveDate) -> Option<AttendanceStatus> {
        self.marks
            .iter()
            .find(|mark| mark.date == date)
            .map(|mark| mark.status)
    }

    pub fn is_in_visible_month(&self, date: NaiveDate) -> bool {
        let (start, end) = month_bounds(self.month_start);
        start <= date && date <= end
    }

    pub fn snapshot(&self) -> CalendarSnapshot {
        CalendarSnapshot {
            subject_id: self.subject_id,
            month: month_key(self.month_start),
            marks: self.marks.clone(),
            summary: self.summary,
            percentage: self.percentage(),
        }
    }

    /// Navigates to the month containing `any_day` and reloads.
    pub fn show_month<R: AttendanceRepository>(&mut self, repo: &R, any_day: NaiveDate) {
        self.month_start = month_bounds(any_day).0;
        self.reload(repo);
    }

    /// Reloads the visible month and the summary.
    ///
    /// A failed read keeps the previous state and posts a notice.
    pub fn reload<R: AttendanceRepository>(&mut self, repo: &R) {
        self.refresh_month(repo);
        self.refresh_summary(repo);
    }

    /// Applies the next status of `date` locally and returns the pending change.
    pub fn begin_toggle(&mut self, date: NaiveDate) -> PendingToggle {
        let previous_marks = self.marks.clone();
        let existing = self.marks.iter().position(|mark| mark.date == date);
        let next = next_status(existing.map(|index| self.marks[index].status));

        match (next, existing) {
            (None, _) => self.marks.retain(|mark| mark.date != date),
            (Some(status), Some(index)) => self.marks[index].status = status,
            (Some(status), None) => {
                self.marks.push(DayMark { date, status });
                self.marks.sort_by_key(|mark| mark.date);
            }
        }

        PendingToggle {
            date,
            next,
            previous_marks,
        }
    }

    /// Confirms `pending` with the store, rolling back on failure.
    pub fn settle<R: AttendanceRepository, A: AuthProvider>(
        &mut self,
        repo: &R,
        auth: &A,
        pending: PendingToggle,
    ) -> ToggleOutcome {
        match self.save(repo, auth, &pending) {
            Ok(()) => {
                info!(
                    "event=attendance_toggle module=view status=ok subject_id={} date={} value={}",
                    self.subject_id,
                    pending.date,
                    pending.next.map_or("unmarked", AttendanceStatus::as_str)
                );
                self.refresh_summary(repo);
                ToggleOutcome::Saved(pending.next)
            }
            Err(err) => {
                warn!(
                    "event=attendance_toggle module=view status=rolled_back subject_id={} date={} error={}",
                    self.subject_id, pending.date, err
                );
                self.marks = pending.previous_marks;
                self.notices.error(MSG_SAVE_FAILED);
                ToggleOutcome::RolledBack
            }
        }
    }

    /// Handles a click on the tile of `date`.
    ///
    /// Clicking a day outside the visible month navigates there first so the
    /// next status is computed from that month's marks.
    pub fn click_day<R: AttendanceRepository, A: AuthProvider>(
        &mut self,
        repo: &R,
        auth: &A,
        date: NaiveDate,
    ) -> ToggleOutcome {
        if !self.is_in_visible_month(date) {
            self.show_month(repo, date);
        }
        let pending = self.begin_toggle(date);
        self.settle(repo, auth, pending)
    }

    fn save<R: AttendanceRepository, A: AuthProvider>(
        &self,
        repo: &R,
        auth: &A,
        pending: &PendingToggle,
    ) -> Result<(), CalendarError> {
        let user = signed_in_user(auth)?;
        AttendanceService::new(repo)
            .apply(self.subject_id, user.id, pending.date, pending.next)
            .map_err(CalendarError::Store)
    }

    fn viewer(&self) -> Result<UserId, CalendarError> {
        self.viewer.ok_or(CalendarError::NotSignedIn)
    }

    fn refresh_month<R: AttendanceRepository>(&mut self, repo: &R) {
        let loaded = self.viewer().and_then(|owner| {
            AttendanceService::new(repo)
                .month_records(owner, self.subject_id, self.month_start)
                .map_err(CalendarError::Store)
        });
        match loaded {
            Ok(marks) => self.marks = marks,
            Err(err) => {
                error!(
                    "event=attendance_month module=view status=error subject_id={} error={}",
                    self.subject_id, err
                );
                self.notices.error(MSG_MONTH_LOAD_FAILED);
            }
        }
    }

    fn refresh_summary<R: AttendanceRepository>(&mut self, repo: &R) {
        let loaded = self.viewer().and_then(|owner| {
            AttendanceService::new(repo)
                .total_summary(owner, self.subject_id)
                .map_err(CalendarError::Store)
        });
        match loaded {
            Ok(summary) => self.summary = summary,
            Err(err) => {
                error!(
                    "event=attendance_summary module=view status=error subject_id={} error={}",
                    self.subject_id, err
                );
                self.notices.error(MSG_SUMMARY_LOAD_FAILED);
            }
        }
    }
}

fn signed_in_user<A: AuthProvider>(auth: &A) -> Result<User, CalendarError> {
    auth.current_user()
        .map_err(CalendarError::Auth)?
        .ok_or(CalendarError::NotSignedIn)
}

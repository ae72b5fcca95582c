//! Core domain logic for Asistencia.
//! This crate is the single source of truth for subject, attendance and
//! grade invariants; front ends only render what the views expose.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use auth::{AuthError, AuthProvider, AuthResult, SqliteSessionStore};
pub use config::AppConfig;
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LoggingError,
};
pub use model::attendance::{
    next_status, AttendanceRecord, AttendanceStatus, AttendanceSummary, DayMark,
};
pub use model::date::{format_date, month_bounds, month_key, parse_date, parse_month_key};
pub use model::grade::{GradeAverage, GradeEntry, GradeId};
pub use model::subject::{Subject, SubjectId};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use repo::attendance_repo::{AttendanceRepository, SqliteAttendanceRepository};
pub use repo::grade_repo::{GradeRepository, SqliteGradeRepository};
pub use repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attendance_service::{AttendanceService, AttendanceServiceError};
pub use service::grade_service::{GradeService, GradeServiceError};
pub use service::subject_service::{SubjectService, SubjectServiceError};
pub use view::calendar::{AttendanceCalendar, CalendarSnapshot, PendingToggle, ToggleOutcome};
pub use view::dashboard::{delete_prompt, DashboardView};
pub use view::grades::GradeCalculatorView;
pub use view::notice::{Notice, NoticeLevel, NoticeQueue};
pub use view::subject_detail::SubjectDetail;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

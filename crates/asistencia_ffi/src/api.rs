//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one function per screen action (login, dashboard, subject detail,
//!   attendance calendar, grade calculator) to Dart via FRB.
//! - Flatten view state and notices into plain envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the configured store, runs one view action and returns
//!   the resulting state; no view state is kept between calls.
//! - IDs cross the boundary as hyphenated UUID strings and dates as
//!   `YYYY-MM-DD` (`YYYY-MM` for months).

use asistencia_core::db::open_db;
use asistencia_core::model::date::{format_date, month_key, parse_date, parse_month_key};
use asistencia_core::view::subject_detail::TITLE_NOT_FOUND;
use asistencia_core::view::LOGIN_ROUTE;
use asistencia_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppConfig, AttendanceCalendar, AuthProvider, DashboardView, GradeCalculatorView, GradeEntry,
    Notice, SqliteAttendanceRepository, SqliteGradeRepository, SqliteSessionStore,
    SqliteSubjectRepository, Subject, SubjectDetail, ToggleOutcome, User,
};
use chrono::{Local, NaiveDate};
use log::warn;
use rusqlite::Connection;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Toast-style message produced by a view action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    /// `success|warning|error`.
    pub level: String,
    pub message: String,
}

/// Session state returned by auth calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub signed_in: bool,
    pub user_id: Option<String>,
    pub email: Option<String>,
    /// Diagnostics for failed calls; empty on success.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectItem {
    pub subject_id: String,
    pub name: String,
}

/// Dashboard list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardResponse {
    pub subjects: Vec<SubjectItem>,
    /// Placeholder shown when `subjects` is empty.
    pub empty_message: Option<String>,
    pub notices: Vec<NoticeItem>,
}

/// Result of a dashboard add/delete action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectActionResponse {
    pub ok: bool,
    /// Created or deleted subject ID.
    pub subject_id: Option<String>,
    pub notices: Vec<NoticeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDetailResponse {
    pub found: bool,
    /// Subject name, or the not-found title.
    pub title: String,
    pub subject_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMarkItem {
    pub date: String,
    /// `presente|ausente`.
    pub status: String,
}

/// Calendar state after open or toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarResponse {
    pub ok: bool,
    /// Visible month as `YYYY-MM`.
    pub month: String,
    pub marks: Vec<DayMarkItem>,
    pub presente: u32,
    pub ausente: u32,
    pub percentage: f64,
    /// `saved|rolled_back` after a toggle; `None` after open.
    pub outcome: Option<String>,
    pub notices: Vec<NoticeItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeItem {
    pub grade_id: String,
    pub label: String,
    pub score: f64,
    pub weight: f64,
}

/// Grade calculator state after load or edit.
#[derive(Debug, Clone, PartialEq)]
pub struct GradesResponse {
    pub ok: bool,
    pub grades: Vec<GradeItem>,
    pub total_weight: f64,
    pub weighted_average: Option<f64>,
    pub notices: Vec<NoticeItem>,
}

/// Signs in as `email`, creating the user on first use.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; invalid emails return `signed_in=false` with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_in(email: String) -> SessionResponse {
    let result = with_store(|store| {
        store
            .session
            .sign_in(email.as_str())
            .map_err(|err| err.to_string())
    });
    match result.and_then(|inner| inner) {
        Ok(user) => SessionResponse::signed_in(user),
        Err(err) => SessionResponse::failure(format!("auth_sign_in failed: {err}")),
    }
}

/// Returns the active session, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_current_user() -> SessionResponse {
    let result = with_store(|store| store.session.current_user().map_err(|err| err.to_string()));
    match result.and_then(|inner| inner) {
        Ok(Some(user)) => SessionResponse::signed_in(user),
        Ok(None) => SessionResponse::signed_out(),
        Err(err) => SessionResponse::failure(format!("auth_current_user failed: {err}")),
    }
}

/// Signs out and returns the route the UI navigates to.
///
/// # FFI contract
/// - Always returns the login route, even when the store call fails.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_out() -> String {
    match with_store(|store| DashboardView::new().logout(&store.session)) {
        Ok(route) => route.to_string(),
        Err(err) => {
            warn!("event=ffi_sign_out module=ffi status=error error={err}");
            LOGIN_ROUTE.to_string()
        }
    }
}

/// Loads the signed-in user's subject list.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_load() -> DashboardResponse {
    match with_store(|store| {
        let mut view = DashboardView::loaded(&store.session, &store.subjects);
        dashboard_response(&mut view)
    }) {
        Ok(response) => response,
        Err(err) => DashboardResponse {
            subjects: Vec::new(),
            empty_message: None,
            notices: vec![error_notice(format!("dashboard_load failed: {err}"))],
        },
    }
}

/// Creates a subject for the signed-in user.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_add_subject(name: String) -> SubjectActionResponse {
    match with_store(|store| {
        let mut view = DashboardView::new();
        let created = view.add_subject(&store.session, &store.subjects, name.as_str());
        SubjectActionResponse {
            ok: created.is_some(),
            subject_id: created.map(|subject| subject.id.to_string()),
            notices: to_notice_items(view.take_notices()),
        }
    }) {
        Ok(response) => response,
        Err(err) => SubjectActionResponse::failure(format!("dashboard_add_subject failed: {err}")),
    }
}

/// Deletes a subject once the user confirmed the prompt.
///
/// `confirmed=false` is a no-op returning `ok=false` without notices.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_delete_subject(subject_id: String, confirmed: bool) -> SubjectActionResponse {
    let subject_id = match parse_id(subject_id.as_str(), "subject_id") {
        Ok(id) => id,
        Err(err) => return SubjectActionResponse::failure(err),
    };
    match with_store(|store| {
        let mut view = DashboardView::new();
        let deleted =
            view.delete_subject(&store.session, &store.subjects, subject_id, confirmed);
        SubjectActionResponse {
            ok: deleted,
            subject_id: deleted.then(|| subject_id.to_string()),
            notices: to_notice_items(view.take_notices()),
        }
    }) {
        Ok(response) => response,
        Err(err) => {
            SubjectActionResponse::failure(format!("dashboard_delete_subject failed: {err}"))
        }
    }
}

/// Loads the detail header of one subject.
#[flutter_rust_bridge::frb(sync)]
pub fn subject_detail(subject_id: String) -> SubjectDetailResponse {
    let detail = parse_id(subject_id.as_str(), "subject_id").and_then(|id| {
        with_store(|store| SubjectDetail::load(&store.session, &store.subjects, id))
    });
    let detail = detail.unwrap_or_else(|err| {
        warn!("event=ffi_subject_detail module=ffi status=error error={err}");
        SubjectDetail::NotFound
    });
    SubjectDetailResponse {
        found: detail.subject().is_some(),
        title: detail.title().to_string(),
        subject_id: detail.subject().map(|subject| subject.id.to_string()),
    }
}

/// Opens the calendar of one subject on `month` (`YYYY-MM`), or on the
/// current month when `month` is `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_open(subject_id: String, month: Option<String>) -> CalendarResponse {
    let anchor = match month.as_deref().map(str::trim) {
        Some(raw) => match parse_month_key(raw) {
            Ok(day) => day,
            Err(err) => return CalendarResponse::failure(err.to_string()),
        },
        None => today(),
    };
    with_owned_subject(subject_id.as_str(), |store, subject| {
        let mut calendar =
            AttendanceCalendar::open(&store.attendance, &store.session, subject.id, anchor);
        calendar_response(&mut calendar, None)
    })
    .unwrap_or_else(|err| CalendarResponse::failure(format!("calendar_open failed: {err}")))
}

/// Cycles the status of `date` (`YYYY-MM-DD`) and returns the settled state
/// of that date's month.
///
/// # FFI contract
/// - A failed save reports `outcome=rolled_back`, the pre-click marks and an
///   error notice.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_click_day(subject_id: String, date: String) -> CalendarResponse {
    let date = match parse_date(date.trim()) {
        Ok(date) => date,
        Err(err) => return CalendarResponse::failure(err.to_string()),
    };
    with_owned_subject(subject_id.as_str(), |store, subject| {
        let mut calendar =
            AttendanceCalendar::open(&store.attendance, &store.session, subject.id, date);
        let outcome = calendar.click_day(&store.attendance, &store.session, date);
        calendar_response(&mut calendar, Some(outcome))
    })
    .unwrap_or_else(|err| CalendarResponse::failure(format!("calendar_click_day failed: {err}")))
}

/// Loads the grades and weighted average of one subject.
#[flutter_rust_bridge::frb(sync)]
pub fn grades_load(subject_id: String) -> GradesResponse {
    with_owned_subject(subject_id.as_str(), |store, subject| {
        let mut view = GradeCalculatorView::load(&store.session, &store.grades, subject.id);
        grades_response(&mut view, true)
    })
    .unwrap_or_else(|err| GradesResponse::failure(format!("grades_load failed: {err}")))
}

/// Adds one grade to a subject.
///
/// Out-of-range input returns `ok=false` with a warning notice.
#[flutter_rust_bridge::frb(sync)]
pub fn grades_add(subject_id: String, label: String, score: f64, weight: f64) -> GradesResponse {
    with_owned_subject(subject_id.as_str(), |store, subject| {
        let mut view = GradeCalculatorView::load(&store.session, &store.grades, subject.id);
        let added = view.add(&store.session, &store.grades, label.as_str(), score, weight);
        grades_response(&mut view, added.is_some())
    })
    .unwrap_or_else(|err| GradesResponse::failure(format!("grades_add failed: {err}")))
}

/// Removes one grade from a subject.
#[flutter_rust_bridge::frb(sync)]
pub fn grades_remove(subject_id: String, grade_id: String) -> GradesResponse {
    let grade_id = match parse_id(grade_id.as_str(), "grade_id") {
        Ok(id) => id,
        Err(err) => return GradesResponse::failure(err),
    };
    with_owned_subject(subject_id.as_str(), |store, subject| {
        let mut view = GradeCalculatorView::load(&store.session, &store.grades, subject.id);
        let removed = view.remove(&store.session, &store.grades, grade_id);
        grades_response(&mut view, removed)
    })
    .unwrap_or_else(|err| GradesResponse::failure(format!("grades_remove failed: {err}")))
}

struct Store<'conn> {
    session: SqliteSessionStore<'conn>,
    subjects: SqliteSubjectRepository<'conn>,
    attendance: SqliteAttendanceRepository<'conn>,
    grades: SqliteGradeRepository<'conn>,
}

impl<'conn> Store<'conn> {
    fn try_new(conn: &'conn Connection) -> Result<Self, String> {
        Ok(Self {
            session: SqliteSessionStore::try_new(conn).map_err(init_failed)?,
            subjects: SqliteSubjectRepository::try_new(conn).map_err(init_failed)?,
            attendance: SqliteAttendanceRepository::try_new(conn).map_err(init_failed)?,
            grades: SqliteGradeRepository::try_new(conn).map_err(init_failed)?,
        })
    }
}

fn init_failed(err: impl Display) -> String {
    format!("store init failed: {err}")
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| match AppConfig::from_env() {
            Ok(config) => config.db_path,
            Err(err) => {
                warn!("event=ffi_config module=ffi status=fallback error={err}");
                AppConfig::default().db_path
            }
        })
        .clone()
}

fn with_store<T>(f: impl FnOnce(&Store<'_>) -> T) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let store = Store::try_new(&conn)?;
    Ok(f(&store))
}

/// Runs `f` only when `raw_id` names a subject of the signed-in user.
fn with_owned_subject<T>(
    raw_id: &str,
    f: impl FnOnce(&Store<'_>, &Subject) -> T,
) -> Result<T, String> {
    let subject_id = parse_id(raw_id, "subject_id")?;
    with_store(
        |store| match SubjectDetail::load(&store.session, &store.subjects, subject_id) {
            SubjectDetail::Found(subject) => Ok(f(store, &subject)),
            SubjectDetail::NotFound => Err(TITLE_NOT_FOUND.to_string()),
        },
    )
    .and_then(|inner| inner)
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid {field} `{}`: {err}", raw.trim()))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn dashboard_response(view: &mut DashboardView) -> DashboardResponse {
    DashboardResponse {
        subjects: view.subjects().iter().map(to_subject_item).collect(),
        empty_message: view.empty_message().map(str::to_string),
        notices: to_notice_items(view.take_notices()),
    }
}

fn calendar_response(
    calendar: &mut AttendanceCalendar,
    outcome: Option<ToggleOutcome>,
) -> CalendarResponse {
    let snapshot = calendar.snapshot();
    CalendarResponse {
        ok: !matches!(outcome, Some(ToggleOutcome::RolledBack)),
        month: snapshot.month,
        marks: snapshot
            .marks
            .iter()
            .map(|mark| DayMarkItem {
                date: format_date(mark.date),
                status: mark.status.as_str().to_string(),
            })
            .collect(),
        presente: snapshot.summary.presente,
        ausente: snapshot.summary.ausente,
        percentage: snapshot.percentage,
        outcome: outcome.map(|outcome| {
            match outcome {
                ToggleOutcome::Saved(_) => "saved",
                ToggleOutcome::RolledBack => "rolled_back",
            }
            .to_string()
        }),
        notices: to_notice_items(calendar.take_notices()),
    }
}

fn grades_response(view: &mut GradeCalculatorView, ok: bool) -> GradesResponse {
    let average = view.average();
    GradesResponse {
        ok,
        grades: view.grades().iter().map(to_grade_item).collect(),
        total_weight: average.total_weight,
        weighted_average: average.weighted_average,
        notices: to_notice_items(view.take_notices()),
    }
}

fn to_subject_item(subject: &Subject) -> SubjectItem {
    SubjectItem {
        subject_id: subject.id.to_string(),
        name: subject.name.clone(),
    }
}

fn to_grade_item(grade: &GradeEntry) -> GradeItem {
    GradeItem {
        grade_id: grade.id.to_string(),
        label: grade.label.clone(),
        score: grade.score,
        weight: grade.weight,
    }
}

fn to_notice_items(notices: Vec<Notice>) -> Vec<NoticeItem> {
    notices
        .into_iter()
        .map(|notice| NoticeItem {
            level: notice.level.as_str().to_string(),
            message: notice.message,
        })
        .collect()
}

fn error_notice(message: String) -> NoticeItem {
    NoticeItem {
        level: "error".to_string(),
        message,
    }
}

impl SessionResponse {
    fn signed_in(user: User) -> Self {
        Self {
            signed_in: true,
            user_id: Some(user.id.to_string()),
            email: Some(user.email),
            message: String::new(),
        }
    }

    fn signed_out() -> Self {
        Self {
            signed_in: false,
            user_id: None,
            email: None,
            message: String::new(),
        }
    }

    fn failure(message: String) -> Self {
        Self {
            message,
            ..Self::signed_out()
        }
    }
}

impl SubjectActionResponse {
    fn failure(message: String) -> Self {
        Self {
            ok: false,
            subject_id: None,
            notices: vec![error_notice(message)],
        }
    }
}

impl CalendarResponse {
    fn failure(message: String) -> Self {
        Self {
            ok: false,
            month: month_key(today()),
            marks: Vec::new(),
            presente: 0,
            ausente: 0,
            percentage: 0.0,
            outcome: None,
            notices: vec![error_notice(message)],
        }
    }
}

impl GradesResponse {
    fn failure(message: String) -> Self {
        Self {
            ok: false,
            grades: Vec::new(),
            total_weight: 0.0,
            weighted_average: None,
            notices: vec![error_notice(message)],
        }
    }
}

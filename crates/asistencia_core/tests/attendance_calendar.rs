use asistencia_core::db::open_db_in_memory;
use asistencia_core::view::calendar::{
    MSG_MONTH_LOAD_FAILED, MSG_SAVE_FAILED, MSG_SUMMARY_LOAD_FAILED,
};
use asistencia_core::{
    AttendanceCalendar, AttendanceRecord, AttendanceRepository, AttendanceStatus,
    AttendanceSummary, AuthError, AuthProvider, AuthResult, DayMark, NoticeLevel, RepoError,
    RepoResult, SqliteAttendanceRepository, SqliteSessionStore, SqliteSubjectRepository, Subject,
    SubjectId, SubjectRepository, ToggleOutcome, User, UserId,
};
use chrono::NaiveDate;
use rusqlite::Connection;

fn day(month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, d).unwrap()
}

/// Signs in and creates one subject for the session user.
fn setup(conn: &Connection) -> (User, SubjectId) {
    let auth = SqliteSessionStore::try_new(conn).unwrap();
    let user = auth.sign_in("ana@example.com").unwrap();
    let repo = SqliteSubjectRepository::try_new(conn).unwrap();
    let subject = repo.create_subject(&Subject::new(user.id, "Historia")).unwrap();
    (user, subject.id)
}

fn unavailable() -> RepoError {
    RepoError::InvalidData("store unavailable".to_string())
}

/// Delegates reads and fails every write.
struct FailingWrites<R>(R);

impl<R: AttendanceRepository> AttendanceRepository for FailingWrites<R> {
    fn list_range(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DayMark>> {
        self.0.list_range(owner, subject_id, start, end)
    }

    fn list_statuses(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> RepoResult<Vec<AttendanceStatus>> {
        self.0.list_statuses(owner, subject_id)
    }

    fn upsert_record(&self, _record: &AttendanceRecord) -> RepoResult<()> {
        Err(unavailable())
    }

    fn delete_record(
        &self,
        _owner: UserId,
        _subject_id: SubjectId,
        _date: NaiveDate,
    ) -> RepoResult<()> {
        Err(unavailable())
    }
}

/// Fails every read and delegates writes.
struct FailingReads<R>(R);

impl<R: AttendanceRepository> AttendanceRepository for FailingReads<R> {
    fn list_range(
        &self,
        _owner: UserId,
        _subject_id: SubjectId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> RepoResult<Vec<DayMark>> {
        Err(unavailable())
    }

    fn list_statuses(
        &self,
        _owner: UserId,
        _subject_id: SubjectId,
    ) -> RepoResult<Vec<AttendanceStatus>> {
        Err(unavailable())
    }

    fn upsert_record(&self, record: &AttendanceRecord) -> RepoResult<()> {
        self.0.upsert_record(record)
    }

    fn delete_record(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        date: NaiveDate,
    ) -> RepoResult<()> {
        self.0.delete_record(owner, subject_id, date)
    }
}

/// Owner and status stored for one day, read straight from SQL.
fn stored_row(conn: &Connection, subject_id: SubjectId, date: &str) -> (String, String) {
    conn.query_row(
        "SELECT user_id, status FROM attendance_records WHERE subject_id = ?1 AND date = ?2;",
        [subject_id.to_string(), date.to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap()
}

struct BrokenAuth;

impl AuthProvider for BrokenAuth {
    fn current_user(&self) -> AuthResult<Option<User>> {
        Err(AuthError::Store(RepoError::InvalidData(
            "session lookup failed".to_string(),
        )))
    }

    fn sign_out(&self) -> AuthResult<()> {
        Ok(())
    }
}

#[test]
fn click_cycles_presente_ausente_unmarked_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();
    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));

    assert_eq!(
        calendar.click_day(&repo, &auth, day(3, 10)),
        ToggleOutcome::Saved(Some(AttendanceStatus::Presente))
    );
    assert_eq!(
        calendar.summary(),
        AttendanceSummary {
            presente: 1,
            ausente: 0
        }
    );

    assert_eq!(
        calendar.click_day(&repo, &auth, day(3, 10)),
        ToggleOutcome::Saved(Some(AttendanceStatus::Ausente))
    );
    assert_eq!(calendar.tile_status(day(3, 10)), Some(AttendanceStatus::Ausente));
    assert_eq!(calendar.percentage(), 0.0);

    assert_eq!(
        calendar.click_day(&repo, &auth, day(3, 10)),
        ToggleOutcome::Saved(None)
    );
    assert_eq!(calendar.tile_status(day(3, 10)), None);
    assert_eq!(calendar.summary().total_marked(), 0);
    assert!(calendar.notices().is_empty());

    let reopened = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 20));
    assert!(reopened.marks().is_empty());
}

#[test]
fn calendar_loads_only_visible_month_but_sums_all_time() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut february = AttendanceCalendar::open(&repo, &auth, subject_id, day(2, 1));
    february.click_day(&repo, &auth, day(2, 3));
    february.click_day(&repo, &auth, day(2, 4));
    february.click_day(&repo, &auth, day(2, 4));

    let march = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 15));
    assert_eq!(march.month_start(), day(3, 1));
    assert!(march.marks().is_empty());
    assert_eq!(
        march.summary(),
        AttendanceSummary {
            presente: 1,
            ausente: 1
        }
    );
    assert!((march.percentage() - 50.0).abs() < f64::EPSILON);

    let snapshot = march.snapshot();
    assert_eq!(snapshot.month, "2025-03");
    assert_eq!(snapshot.subject_id, subject_id);
}

#[test]
fn click_outside_visible_month_navigates_there_first() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    calendar.click_day(&repo, &auth, day(4, 2));

    assert_eq!(calendar.month_start(), day(4, 1));
    assert_eq!(calendar.tile_status(day(4, 2)), Some(AttendanceStatus::Presente));
}

#[test]
fn failed_save_rolls_back_to_previous_marks() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    calendar.click_day(&repo, &auth, day(3, 5));
    let before = calendar.marks().to_vec();
    let summary_before = calendar.summary();

    let failing = FailingWrites(&repo);
    let pending = calendar.begin_toggle(day(3, 5));
    assert_eq!(calendar.tile_status(day(3, 5)), Some(AttendanceStatus::Ausente));

    assert_eq!(
        calendar.settle(&failing, &auth, pending),
        ToggleOutcome::RolledBack
    );
    assert_eq!(calendar.marks(), &before[..]);
    assert_eq!(calendar.summary(), summary_before);

    let notices = calendar.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, MSG_SAVE_FAILED);

    let stored = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    assert_eq!(stored.tile_status(day(3, 5)), Some(AttendanceStatus::Presente));
}

#[test]
fn failed_clear_restores_removed_mark() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    calendar.click_day(&repo, &auth, day(3, 5));
    calendar.click_day(&repo, &auth, day(3, 5));

    let outcome = calendar.click_day(&FailingWrites(&repo), &auth, day(3, 5));
    assert_eq!(outcome, ToggleOutcome::RolledBack);
    assert_eq!(calendar.tile_status(day(3, 5)), Some(AttendanceStatus::Ausente));
}

#[test]
fn signed_out_click_rolls_back() {
    let conn = open_db_in_memory().unwrap();
    let (user, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();
    auth.sign_out().unwrap();

    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    let outcome = calendar.click_day(&repo, &auth, day(3, 7));

    assert_eq!(outcome, ToggleOutcome::RolledBack);
    assert!(calendar.marks().is_empty());
    assert!(calendar.notices().has_errors());
    assert!(repo.list_statuses(user.id, subject_id).unwrap().is_empty());
}

#[test]
fn auth_failure_rolls_back() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    let outcome = calendar.click_day(&repo, &BrokenAuth, day(3, 7));

    assert_eq!(outcome, ToggleOutcome::RolledBack);
    assert_eq!(calendar.tile_status(day(3, 7)), None);
}

#[test]
fn snapshot_serializes_for_front_ends() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    calendar.click_day(&repo, &auth, day(3, 10));

    let json = serde_json::to_value(calendar.snapshot()).unwrap();
    assert_eq!(json["month"], "2025-03");
    assert_eq!(json["marks"][0]["date"], "2025-03-10");
    assert_eq!(json["marks"][0]["status"], "presente");
    assert_eq!(json["summary"]["presente"], 1);
    assert_eq!(json["percentage"], 100.0);
}

#[test]
fn failed_loads_keep_previous_marks_and_summary() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    calendar.click_day(&repo, &auth, day(3, 5));
    let marks_before = calendar.marks().to_vec();
    let summary_before = calendar.summary();
    assert!(calendar.take_notices().is_empty());

    calendar.show_month(&FailingReads(&repo), day(4, 1));

    assert_eq!(calendar.month_start(), day(4, 1));
    assert_eq!(calendar.marks(), &marks_before[..]);
    assert_eq!(calendar.summary(), summary_before);
    let messages: Vec<String> = calendar
        .take_notices()
        .into_iter()
        .map(|notice| notice.message)
        .collect();
    assert_eq!(messages, vec![MSG_MONTH_LOAD_FAILED, MSG_SUMMARY_LOAD_FAILED]);
}

#[test]
fn summary_failure_after_save_keeps_previous_summary() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    let outcome = calendar.click_day(&FailingReads(&repo), &auth, day(3, 5));

    assert_eq!(outcome, ToggleOutcome::Saved(Some(AttendanceStatus::Presente)));
    assert_eq!(calendar.tile_status(day(3, 5)), Some(AttendanceStatus::Presente));
    assert_eq!(calendar.summary(), AttendanceSummary::default());
    let notices = calendar.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, MSG_SUMMARY_LOAD_FAILED);
}

#[test]
fn other_users_cannot_read_or_toggle_a_subject() {
    let conn = open_db_in_memory().unwrap();
    let (ana, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteAttendanceRepository::try_new(&conn).unwrap();

    let mut ana_calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    ana_calendar.click_day(&repo, &auth, day(3, 10));

    auth.sign_in("eve@example.com").unwrap();
    let mut eve_calendar = AttendanceCalendar::open(&repo, &auth, subject_id, day(3, 1));
    assert!(eve_calendar.marks().is_empty());
    assert_eq!(eve_calendar.summary(), AttendanceSummary::default());
    assert!(eve_calendar.notices().has_errors());
    eve_calendar.take_notices();

    assert_eq!(
        eve_calendar.click_day(&repo, &auth, day(3, 10)),
        ToggleOutcome::RolledBack
    );
    assert!(eve_calendar.marks().is_empty());
    assert_eq!(eve_calendar.take_notices()[0].message, MSG_SAVE_FAILED);

    // A calendar opened by the owner does not let the next session write.
    assert_eq!(
        ana_calendar.click_day(&repo, &auth, day(3, 10)),
        ToggleOutcome::RolledBack
    );
    assert_eq!(
        ana_calendar.tile_status(day(3, 10)),
        Some(AttendanceStatus::Presente)
    );

    assert_eq!(
        stored_row(&conn, subject_id, "2025-03-10"),
        (ana.id.to_string(), "presente".to_string())
    );
}

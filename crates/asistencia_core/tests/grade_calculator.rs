use asistencia_core::db::open_db_in_memory;
use asistencia_core::view::grades::{
    MSG_ADDED, MSG_LOAD_FAILED, MSG_REMOVE_FAILED, MSG_SAVE_FAILED,
};
use asistencia_core::{
    AuthProvider, GradeCalculatorView, GradeEntry, GradeId, GradeRepository, GradeService,
    GradeServiceError, NoticeLevel, RepoError, RepoResult, SqliteGradeRepository,
    SqliteSessionStore, SqliteSubjectRepository, Subject, SubjectId, SubjectRepository, User,
    UserId, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn setup(conn: &Connection) -> (User, SubjectId) {
    let auth = SqliteSessionStore::try_new(conn).unwrap();
    let user = auth.sign_in("ana@example.com").unwrap();
    let repo = SqliteSubjectRepository::try_new(conn).unwrap();
    let subject = repo.create_subject(&Subject::new(user.id, "Lengua")).unwrap();
    (user, subject.id)
}

/// Grade store whose list query always fails.
struct FailingList<R>(R);

impl<R: GradeRepository> GradeRepository for FailingList<R> {
    fn create_grade(&self, grade: &GradeEntry) -> RepoResult<GradeId> {
        self.0.create_grade(grade)
    }

    fn list_grades(&self, _owner: UserId, _subject_id: SubjectId) -> RepoResult<Vec<GradeEntry>> {
        Err(RepoError::InvalidData("store unavailable".to_string()))
    }

    fn delete_grade(&self, owner: UserId, subject_id: SubjectId, id: GradeId) -> RepoResult<()> {
        self.0.delete_grade(owner, subject_id, id)
    }
}

#[test]
fn weighted_average_over_stored_grades() {
    let conn = open_db_in_memory().unwrap();
    let (user, subject_id) = setup(&conn);
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();
    let service = GradeService::new(&repo);

    service.add(subject_id, user.id, "Examen", 8.0, 60.0).unwrap();
    service.add(subject_id, user.id, "Trabajo", 5.0, 40.0).unwrap();

    let average = service.average(user.id, subject_id).unwrap();
    assert_eq!(average.entries, 2);
    assert!((average.total_weight - 100.0).abs() < f64::EPSILON);
    assert!((average.weighted_average.unwrap() - 6.8).abs() < 1e-9);
}

#[test]
fn service_rejects_out_of_range_values_before_storing() {
    let conn = open_db_in_memory().unwrap();
    let (user, subject_id) = setup(&conn);
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();
    let service = GradeService::new(&repo);

    assert!(matches!(
        service.add(subject_id, user.id, "Examen", 10.5, 50.0),
        Err(GradeServiceError::Invalid(ValidationError::ScoreOutOfRange(_)))
    ));
    assert!(matches!(
        service.add(subject_id, user.id, "Examen", 5.0, 0.0),
        Err(GradeServiceError::Invalid(ValidationError::WeightOutOfRange(_)))
    ));
    assert!(matches!(
        service.add(subject_id, user.id, "  ", 5.0, 10.0),
        Err(GradeServiceError::Invalid(ValidationError::BlankGradeLabel))
    ));
    assert!(repo.list_grades(user.id, subject_id).unwrap().is_empty());
}

#[test]
fn service_maps_missing_subject_and_grade() {
    let conn = open_db_in_memory().unwrap();
    let (user, subject_id) = setup(&conn);
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();
    let service = GradeService::new(&repo);

    let missing_subject = Uuid::new_v4();
    assert!(matches!(
        service.add(missing_subject, user.id, "Examen", 5.0, 10.0),
        Err(GradeServiceError::SubjectNotFound(id)) if id == missing_subject
    ));

    let missing_grade = Uuid::new_v4();
    assert!(matches!(
        service.delete(user.id, subject_id, missing_grade),
        Err(GradeServiceError::GradeNotFound(id)) if id == missing_grade
    ));
    assert!(matches!(
        repo.delete_grade(user.id, subject_id, missing_grade),
        Err(RepoError::NotFound { entity: "grade", .. })
    ));
}

#[test]
fn view_add_and_remove_update_list_and_notices() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();

    let mut view = GradeCalculatorView::load(&auth, &repo, subject_id);
    assert!(view.grades().is_empty());
    assert_eq!(view.average().weighted_average, None);

    let grade = view.add(&auth, &repo, "Examen", 9.0, 30.0).unwrap();
    assert_eq!(view.grades().len(), 1);
    assert_eq!(view.take_notices()[0].message, MSG_ADDED);

    let reloaded = GradeCalculatorView::load(&auth, &repo, subject_id);
    assert_eq!(reloaded.grades(), view.grades());

    assert!(view.remove(&auth, &repo, grade.id));
    assert!(view.grades().is_empty());
    assert!(!view.remove(&auth, &repo, grade.id));
    let notices = view.take_notices();
    assert_eq!(notices.last().unwrap().message, MSG_REMOVE_FAILED);
}

#[test]
fn view_turns_invalid_input_into_warning() {
    let conn = open_db_in_memory().unwrap();
    let (_, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();

    let mut view = GradeCalculatorView::load(&auth, &repo, subject_id);
    assert!(view.add(&auth, &repo, "Examen", -1.0, 30.0).is_none());

    let notices = view.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].message, "La nota debe estar entre 0 y 10.");
}

#[test]
fn view_add_while_signed_out_posts_error() {
    let conn = open_db_in_memory().unwrap();
    let (user, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();
    auth.sign_out().unwrap();

    let mut view = GradeCalculatorView::load(&auth, &repo, subject_id);
    assert_eq!(view.take_notices()[0].message, MSG_LOAD_FAILED);
    assert!(view.add(&auth, &repo, "Examen", 7.0, 30.0).is_none());
    let notices = view.take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, MSG_SAVE_FAILED);
    assert!(repo.list_grades(user.id, subject_id).unwrap().is_empty());
}

#[test]
fn view_remove_requires_the_subject_owner() {
    let conn = open_db_in_memory().unwrap();
    let (user, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();

    let mut view = GradeCalculatorView::load(&auth, &repo, subject_id);
    let grade = view.add(&auth, &repo, "Examen", 6.0, 50.0).unwrap();
    view.take_notices();

    auth.sign_out().unwrap();
    assert!(!view.remove(&auth, &repo, grade.id));
    assert_eq!(view.take_notices()[0].message, MSG_REMOVE_FAILED);

    auth.sign_in("eve@example.com").unwrap();
    assert!(!view.remove(&auth, &repo, grade.id));
    assert_eq!(view.grades().len(), 1);

    let eve_view = GradeCalculatorView::load(&auth, &repo, subject_id);
    assert!(eve_view.grades().is_empty());
    assert!(eve_view.notices().has_errors());
    assert!(view.add(&auth, &repo, "Trabajo", 9.0, 20.0).is_none());

    assert_eq!(repo.list_grades(user.id, subject_id).unwrap(), vec![grade]);
}

#[test]
fn failed_load_posts_error_and_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    let (user, subject_id) = setup(&conn);
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    let repo = SqliteGradeRepository::try_new(&conn).unwrap();
    GradeService::new(&repo)
        .add(subject_id, user.id, "Examen", 7.0, 40.0)
        .unwrap();

    let mut view = GradeCalculatorView::load(&auth, &FailingList(&repo), subject_id);
    assert!(view.grades().is_empty());
    assert_eq!(view.average().weighted_average, None);
    let notices = view.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, MSG_LOAD_FAILED);
}

use asistencia_core::db::{open_db, open_db_in_memory};
use asistencia_core::{AuthError, AuthProvider, SqliteSessionStore};

#[test]
fn fresh_store_has_no_session() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteSessionStore::try_new(&conn).unwrap();

    assert_eq!(auth.current_user().unwrap(), None);
}

#[test]
fn sign_in_normalizes_email_and_reuses_identity() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteSessionStore::try_new(&conn).unwrap();

    let first = auth.sign_in("  Ana@Example.COM ").unwrap();
    assert_eq!(first.email, "ana@example.com");
    assert_eq!(auth.current_user().unwrap(), Some(first.clone()));

    auth.sign_out().unwrap();
    let again = auth.sign_in("ana@example.com").unwrap();
    assert_eq!(again.id, first.id);
}

#[test]
fn sign_in_replaces_previous_session() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteSessionStore::try_new(&conn).unwrap();

    auth.sign_in("ana@example.com").unwrap();
    let luis = auth.sign_in("luis@example.com").unwrap();

    assert_eq!(auth.current_user().unwrap(), Some(luis));
}

#[test]
fn sign_in_rejects_invalid_email() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteSessionStore::try_new(&conn).unwrap();

    for raw in ["", "   ", "sin-arroba"] {
        let err = auth.sign_in(raw).unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)), "input: {raw:?}");
    }
    assert_eq!(auth.current_user().unwrap(), None);
}

#[test]
fn sign_out_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let auth = SqliteSessionStore::try_new(&conn).unwrap();

    auth.sign_in("ana@example.com").unwrap();
    auth.sign_out().unwrap();
    auth.sign_out().unwrap();
    assert_eq!(auth.current_user().unwrap(), None);
}

#[test]
fn session_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.db");

    let user = {
        let conn = open_db(&path).unwrap();
        let auth = SqliteSessionStore::try_new(&conn).unwrap();
        auth.sign_in("ana@example.com").unwrap()
    };

    let conn = open_db(&path).unwrap();
    let auth = SqliteSessionStore::try_new(&conn).unwrap();
    assert_eq!(auth.current_user().unwrap(), Some(user));
}

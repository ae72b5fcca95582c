//! SQLite-backed session store.

use super::{AuthError, AuthProvider, AuthResult};
use crate::model::user::{normalize_email, User};
use crate::repo::{ensure_schema_ready, parse_uuid_column};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

/// Session store over the `users` and single-row `session` tables.
pub struct SqliteSessionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> AuthResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    /// Makes `email` the active identity, creating the user on first use.
    ///
    /// Replaces any existing session.
    pub fn sign_in(&self, email: &str) -> AuthResult<User> {
        let normalized = normalize_email(email)
            .ok_or_else(|| AuthError::InvalidEmail(email.trim().to_string()))?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO users (id, email) VALUES (?1, ?2);",
            params![Uuid::new_v4().to_string(), normalized.as_str()],
        )?;
        let id_text: String = tx.query_row(
            "SELECT id FROM users WHERE email = ?1;",
            [normalized.as_str()],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO session (slot, user_id) VALUES (1, ?1)
             ON CONFLICT(slot) DO UPDATE SET
                user_id = excluded.user_id,
                signed_in_at = (strftime('%s', 'now') * 1000);",
            [id_text.as_str()],
        )?;
        tx.commit()?;

        let user = User {
            id: parse_uuid_column(&id_text, "users.id")?,
            email: normalized,
        };
        info!("event=auth_sign_in module=auth status=ok user_id={}", user.id);
        Ok(user)
    }
}

impl AuthProvider for SqliteSessionStore<'_> {
    fn current_user(&self) -> AuthResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT u.id, u.email
                 FROM session s
                 INNER JOIN users u ON u.id = s.user_id
                 WHERE s.slot = 1;",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((id_text, email)) => Ok(Some(User {
                id: parse_uuid_column(&id_text, "users.id")?,
                email,
            })),
            None => Ok(None),
        }
    }

    fn sign_out(&self) -> AuthResult<()> {
        let removed = self.conn.execute("DELETE FROM session;", [])?;
        info!(
            "event=auth_sign_out module=auth status=ok had_session={}",
            removed > 0
        );
        Ok(())
    }
}
